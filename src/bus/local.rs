//! In-process event bus.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use super::{Handler, Publisher, Subscriber, SubscriptionId};
use crate::error::Result;
use crate::event::Event;
use crate::subject;

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    subject: String,
    handler: Arc<dyn Handler>,
}

type Registry = Arc<Vec<Subscription>>;

/// Single-process bus that dispatches synchronously.
///
/// Handlers run inline on the publishing thread, in registration order, so a
/// slow handler stalls its publisher. Registration is serialized by a lock;
/// `publish` works on a snapshot of the registry and holds no lock while
/// handlers run, so handlers may themselves subscribe or unsubscribe.
///
/// Cloning yields another handle to the same registry.
///
/// ## Example
///
/// ```
/// use sourced_bus::bus::{handler_fn, LocalBus, Publisher, Subscriber};
/// use sourced_bus::Event;
///
/// let bus = LocalBus::new();
/// bus.subscribe("orders.*", handler_fn(|event| {
///     println!("got {}", event.topic());
///     Ok(())
/// })).unwrap();
///
/// let event = Event::create("order#1", "orders.created", &"payload").unwrap();
/// bus.publish(&[event]).unwrap();
/// ```
#[derive(Clone, Default)]
pub struct LocalBus {
    registry: Arc<Mutex<Registry>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Subscribed patterns in registration order.
    pub fn subjects(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|subscription| subscription.subject.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // The registry is replaced or pushed to atomically, a panicking
        // holder cannot leave it half-written.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Registry {
        Arc::clone(&self.lock())
    }
}

impl Publisher for LocalBus {
    fn publish(&self, events: &[Event]) -> Result<()> {
        let subscriptions = self.snapshot();

        for event in events {
            debug!(event_id = event.id(), topic = event.topic(), "dispatching event");

            let matching = subscriptions
                .iter()
                .filter(|subscription| subject::matches(&subscription.subject, event.topic()));

            for subscription in matching {
                trace!(
                    subscription = %subscription.id,
                    subject = %subscription.subject,
                    event_id = event.id(),
                    "invoking handler"
                );

                if let Err(err) = subscription.handler.handle(event) {
                    warn!(
                        subscription = %subscription.id,
                        event_id = event.id(),
                        topic = event.topic(),
                        error = %err,
                        "handler failed, aborting publish"
                    );
                    return Err(err.for_event(event));
                }
            }
        }

        Ok(())
    }
}

impl Subscriber for LocalBus {
    fn subscribe(&self, subject: &str, handler: Box<dyn Handler>) -> Result<SubscriptionId> {
        let id = SubscriptionId::next();

        let mut registry = self.lock();
        Arc::make_mut(&mut registry).push(Subscription {
            id,
            subject: subject.to_string(),
            handler: Arc::from(handler),
        });

        debug!(subscription = %id, subject, "subscribed");
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        let mut registry = self.lock();
        let Some(index) = registry.iter().position(|subscription| subscription.id == id) else {
            return Ok(false);
        };

        Arc::make_mut(&mut registry).remove(index);
        debug!(subscription = %id, "unsubscribed");
        Ok(true)
    }
}
