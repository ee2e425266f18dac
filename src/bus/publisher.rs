//! Core publisher trait for the event bus.

use std::sync::Arc;

use crate::error::Result;
use crate::event::Event;

/// Trait for publishing events to a bus.
///
/// Events are published in the order given. Publication stops at the first
/// failure: the returned error carries the event that failed (see
/// [`Error::event`](crate::Error::event)), every event before it has already
/// been published and none after it has. A batch is therefore not atomic.
///
/// Implementations in this crate:
/// - [`LocalBus`](super::LocalBus) - in-process, handlers run on the caller's thread
/// - [`DistributedBus`](super::DistributedBus) - serializes onto a network transport
pub trait Publisher: Send + Sync {
    fn publish(&self, events: &[Event]) -> Result<()>;

    /// Publish a single event.
    fn publish_one(&self, event: &Event) -> Result<()> {
        self.publish(std::slice::from_ref(event))
    }
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    fn publish(&self, events: &[Event]) -> Result<()> {
        (**self).publish(events)
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&self, events: &[Event]) -> Result<()> {
        (**self).publish(events)
    }
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(&self, events: &[Event]) -> Result<()> {
        (**self).publish(events)
    }
}
