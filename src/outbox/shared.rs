use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::collector::{publish_batch, EventCollector, FlushResult};
use super::Publishable;
use crate::bus::Publisher;
use crate::error::Result;
use crate::event::Event;

/// [`EventCollector`] shared between concurrent writers.
///
/// Clones share one buffer. Each operation takes the lock for its own
/// duration only; `flush` drains under the lock and publishes without it, so
/// writers are never blocked behind the publisher.
#[derive(Clone, Debug, Default)]
pub struct SharedCollector {
    inner: Arc<Mutex<EventCollector>>,
}

impl SharedCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<P>(&self, publishable: &P) -> Result<()>
    where
        P: Publishable + ?Sized,
    {
        // Serialize before locking.
        let event = Event::create(publishable.entity_id(), publishable.topic(), publishable)?;
        self.record_event(event);
        Ok(())
    }

    pub fn record_event(&self, event: Event) {
        self.lock().record_event(event);
    }

    pub fn all(&self) -> Vec<Event> {
        self.lock().all()
    }

    pub fn drain(&self) -> Vec<Event> {
        self.lock().drain()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Same contract as [`EventCollector::flush`]. Unpublished events are put
    /// back ahead of events other writers recorded during the publish.
    pub fn flush<P>(&self, publisher: &P) -> Result<FlushResult>
    where
        P: Publisher + ?Sized,
    {
        let events = self.drain();
        publish_batch(publisher, events).map_err(|(err, unpublished)| {
            self.lock().requeue(unpublished);
            err
        })
    }

    fn lock(&self) -> MutexGuard<'_, EventCollector> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<EventCollector> for SharedCollector {
    fn from(collector: EventCollector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(collector)),
        }
    }
}
