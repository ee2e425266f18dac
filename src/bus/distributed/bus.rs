//! Distributed bus: Publisher/Subscriber over a network transport.

use std::sync::Arc;

use tracing::{debug, trace};

use super::dead_letter::{DeadLetter, DeadLetterSink, LogDeadLetters};
use super::transport::{MessageCallback, Transport, TransportMessage};
use super::wire::WireEnvelope;
use crate::bus::{Handler, Publisher, Subscriber, SubscriptionId};
use crate::error::{Error, ErrorKind, Result};
use crate::event::Event;
use crate::metadata::Metadata;
use crate::subject;

/// Bridges the bus contracts onto a [`Transport`].
///
/// Every subscription joins the bus's queue group, so several processes
/// running a `DistributedBus` with the same group share the load: each
/// message is handled by exactly one of them. Processes with different
/// groups each receive every message.
///
/// `publish` returns once the transport client accepted the message; it
/// does not wait for remote handlers.
///
/// ## Example
///
/// ```
/// use sourced_bus::bus::{handler_fn, DistributedBus, InMemoryTransport, Publisher, Subscriber};
/// use sourced_bus::Event;
///
/// let transport = InMemoryTransport::new();
/// let billing = DistributedBus::new(transport.clone(), "billing");
///
/// billing
///     .subscribe("orders.*", handler_fn(|event| {
///         println!("billing saw {}", event.topic());
///         Ok(())
///     }))
///     .unwrap();
///
/// let producer = DistributedBus::new(transport, "orders");
/// let event = Event::create("order#1", "orders.created", &12).unwrap();
/// producer.publish(&[event]).unwrap();
/// ```
pub struct DistributedBus<T> {
    transport: Arc<T>,
    queue_group: String,
    dead_letters: Arc<dyn DeadLetterSink>,
}

impl<T> Clone for DistributedBus<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            queue_group: self.queue_group.clone(),
            dead_letters: Arc::clone(&self.dead_letters),
        }
    }
}

impl<T: Transport> DistributedBus<T> {
    /// Create a bus whose subscriptions join `queue_group`.
    ///
    /// Undeliverable incoming messages are logged and dropped unless a sink
    /// is set with [`with_dead_letters`](Self::with_dead_letters).
    pub fn new(transport: T, queue_group: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            queue_group: queue_group.into(),
            dead_letters: Arc::new(LogDeadLetters),
        }
    }

    /// Route receive-path failures to `sink`.
    pub fn with_dead_letters<S>(mut self, sink: S) -> Self
    where
        S: DeadLetterSink + 'static,
    {
        self.dead_letters = Arc::new(sink);
        self
    }

    pub fn queue_group(&self) -> &str {
        &self.queue_group
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Publisher for DistributedBus<T> {
    fn publish(&self, events: &[Event]) -> Result<()> {
        for event in events {
            let bytes = WireEnvelope::from_event(event)
                .encode()
                .map_err(|err| err.with_event(event.clone()))?;

            self.transport
                .publish(event.topic(), bytes)
                .map_err(|err| {
                    Error::wrap(ErrorKind::Publish, err, "could not publish event")
                        .with_metadata(
                            Metadata::with("subject", event.topic())
                                .and("queue_group", &self.queue_group),
                        )
                        .with_event(event.clone())
                })?;

            debug!(
                event_id = event.id(),
                topic = event.topic(),
                "published event to transport"
            );
        }

        Ok(())
    }
}

impl<T: Transport> Subscriber for DistributedBus<T> {
    fn subscribe(&self, subject: &str, handler: Box<dyn Handler>) -> Result<SubscriptionId> {
        let metadata = || {
            Metadata::with("subject", subject).and("queue_group", &self.queue_group)
        };

        subject::validate_pattern(subject).map_err(|err| {
            Error::wrap(
                ErrorKind::Subscribe,
                err,
                format!("could not subscribe to {} subject", subject),
            )
            .with_metadata(metadata())
        })?;

        let handler: Arc<dyn Handler> = Arc::from(handler);
        let dead_letters = Arc::clone(&self.dead_letters);
        let callback: MessageCallback = Arc::new(move |message: TransportMessage| {
            receive(handler.as_ref(), dead_letters.as_ref(), message)
        });

        let id = self
            .transport
            .queue_subscribe(subject, &self.queue_group, callback)
            .map_err(|err| {
                Error::wrap(
                    ErrorKind::Subscribe,
                    err,
                    format!("could not subscribe to {} subject", subject),
                )
                .with_metadata(metadata())
            })?;

        debug!(subscription = %id, subject, queue_group = %self.queue_group, "subscribed");
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.transport.unsubscribe(id).map_err(|err| {
            Error::wrap(ErrorKind::Transport, err, "could not unsubscribe")
                .with_metadata(Metadata::with("subscription", id.get()))
        })
    }
}

/// Decode, rebuild and dispatch one incoming message.
///
/// Any failure becomes a dead letter; the subscription keeps running.
fn receive(handler: &dyn Handler, dead_letters: &dyn DeadLetterSink, message: TransportMessage) {
    let delivered = WireEnvelope::decode(&message.payload)
        .and_then(WireEnvelope::into_event)
        .and_then(|event| {
            trace!(event_id = event.id(), subject = %message.subject, "handling incoming event");
            handler.handle(&event).map_err(|err| err.for_event(&event))
        });

    if let Err(error) = delivered {
        dead_letters.dead_letter(DeadLetter {
            subject: message.subject,
            payload: message.payload,
            error,
        });
    }
}
