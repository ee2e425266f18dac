use std::mem;

use tracing::{debug, warn};

use super::Publishable;
use crate::bus::Publisher;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::metadata::Metadata;

/// Result of a flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushResult {
    /// Number of events handed to the publisher successfully.
    pub published: usize,
}

/// Buffers events produced during a unit of work until they are published.
///
/// Create one per aggregate operation or request, record the events it
/// produces, then [`drain`](Self::drain) or [`flush`](Self::flush) them once
/// the work has been committed.
///
/// Event ids must be unique within a collector. [`flush`](Self::flush)
/// locates the failing event by id, so a batch holding the same event twice
/// resumes from its first copy.
#[derive(Clone, Debug, Default)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with already constructed events.
    pub fn with_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Derive an event from `publishable` and buffer it.
    ///
    /// The publishable itself is serialized as the payload. Nothing is
    /// buffered when serialization fails.
    pub fn record<P>(&mut self, publishable: &P) -> Result<()>
    where
        P: Publishable + ?Sized,
    {
        let event = Event::create(publishable.entity_id(), publishable.topic(), publishable)?;
        self.record_event(event);
        Ok(())
    }

    /// Buffer an already constructed event. Its id must not already be
    /// buffered.
    pub fn record_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Copy of the buffered events, in recording order.
    pub fn all(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// Take every buffered event, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<Event> {
        mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drain and publish in one step.
    ///
    /// When the publisher fails, the failing event and everything after it
    /// go back to the front of the buffer so the next flush retries exactly
    /// the unpublished events. The error gains a `published` entry with the
    /// number of events that did go out.
    pub fn flush<P>(&mut self, publisher: &P) -> Result<FlushResult>
    where
        P: Publisher + ?Sized,
    {
        let events = self.drain();
        match publish_batch(publisher, events) {
            Ok(result) => Ok(result),
            Err((err, unpublished)) => {
                self.requeue(unpublished);
                Err(err)
            }
        }
    }

    /// Put `events` back ahead of anything recorded since they were drained.
    pub(crate) fn requeue(&mut self, mut events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        events.append(&mut self.events);
        self.events = events;
    }
}

/// Publish `events`, returning the unpublished suffix on failure.
pub(crate) fn publish_batch<P>(
    publisher: &P,
    mut events: Vec<Event>,
) -> std::result::Result<FlushResult, (Error, Vec<Event>)>
where
    P: Publisher + ?Sized,
{
    if events.is_empty() {
        return Ok(FlushResult::default());
    }

    match publisher.publish(&events) {
        Ok(()) => {
            debug!(count = events.len(), "flushed collected events");
            Ok(FlushResult {
                published: events.len(),
            })
        }
        Err(err) => {
            // Without a named event nothing is known to have gone out. Ids are
            // unique per collector, so the first match is the failing event.
            let published = err
                .event()
                .and_then(|failed| events.iter().position(|event| event.id() == failed.id()))
                .unwrap_or(0);
            let unpublished = events.split_off(published);

            warn!(
                published,
                unpublished = unpublished.len(),
                error = %err,
                "flush stopped at failing event"
            );
            Err((
                err.with_metadata(Metadata::with("published", published)),
                unpublished,
            ))
        }
    }
}
