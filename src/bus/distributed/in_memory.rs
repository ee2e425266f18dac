//! In-memory transport for testing and single-process scenarios.
//!
//! This module provides a thread-safe broker that implements [`Transport`]
//! with broker-style semantics, useful for:
//! - Unit and integration testing without a running broker
//! - Exercising queue-group delivery between several bus instances
//! - Development and prototyping

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::trace;

use super::transport::{MessageCallback, Transport, TransportError, TransportMessage};
use crate::bus::SubscriptionId;
use crate::error::BoxError;
use crate::subject;

struct QueueSubscription {
    id: SubscriptionId,
    subject: String,
    queue_group: String,
    callback: MessageCallback,
}

#[derive(Default)]
struct Subscriptions {
    entries: Vec<QueueSubscription>,
    /// Round-robin position per (subject, queue group).
    cursors: HashMap<(String, String), usize>,
}

/// In-memory broker.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - Native `*` and `>` wildcard matching
/// - Queue groups: members subscribed to the same subject under the same
///   group share its messages round-robin, one member per message
/// - Published messages are kept in an append-only log for inspection
///
/// Callbacks run on the publishing thread, outside of any internal lock.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use sourced_bus::bus::{InMemoryTransport, Transport, TransportMessage};
///
/// let transport = InMemoryTransport::new();
/// transport
///     .queue_subscribe("orders.*", "billing", Arc::new(|message: TransportMessage| {
///         assert_eq!(message.subject, "orders.created");
///     }))
///     .unwrap();
///
/// transport.publish("orders.created", b"{}".to_vec()).unwrap();
/// assert_eq!(transport.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    /// Shared message log
    log: Arc<RwLock<Vec<TransportMessage>>>,
    subscriptions: Arc<Mutex<Subscriptions>>,
    closed: Arc<AtomicBool>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far.
    pub fn published(&self) -> Vec<TransportMessage> {
        self.read_log().clone()
    }

    /// Messages published on exactly `subject`.
    pub fn published_on(&self, subject: &str) -> Vec<TransportMessage> {
        self.read_log()
            .iter()
            .filter(|message| message.subject == subject)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_log().is_empty()
    }

    /// Number of live queue subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.lock_subscriptions().entries.len()
    }

    /// Clear the message log (useful for test cleanup).
    pub fn clear(&self) {
        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Refuse every further publish and subscribe, like a dropped connection.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn read_log(&self) -> std::sync::RwLockReadGuard<'_, Vec<TransportMessage>> {
        self.log.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscriptions(&self) -> MutexGuard<'_, Subscriptions> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Pick one member of every queue group whose subject matches.
    fn select_receivers(&self, topic: &str) -> Vec<(SubscriptionId, MessageCallback)> {
        let mut subscriptions = self.lock_subscriptions();
        let Subscriptions { entries, cursors } = &mut *subscriptions;

        let mut groups: Vec<((String, String), Vec<&QueueSubscription>)> = Vec::new();
        for entry in entries.iter().filter(|entry| subject::matches(&entry.subject, topic)) {
            let key = (entry.subject.clone(), entry.queue_group.clone());
            match groups.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, members)) => members.push(entry),
                None => groups.push((key, vec![entry])),
            }
        }

        groups
            .into_iter()
            .map(|(key, members)| {
                let cursor = cursors.entry(key).or_insert(0);
                let chosen = members[*cursor % members.len()];
                *cursor = cursor.wrapping_add(1);
                (chosen.id, Arc::clone(&chosen.callback))
            })
            .collect()
    }
}

impl Transport for InMemoryTransport {
    fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BoxError> {
        if self.is_closed() {
            return Err(TransportError::Closed.into());
        }

        let message = TransportMessage {
            subject: subject.to_string(),
            payload,
        };
        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());

        for (id, callback) in self.select_receivers(subject) {
            trace!(subscription = %id, subject, "delivering message");
            callback(message.clone());
        }

        Ok(())
    }

    fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
        callback: MessageCallback,
    ) -> Result<SubscriptionId, BoxError> {
        if self.is_closed() {
            return Err(TransportError::Closed.into());
        }

        let id = SubscriptionId::next();
        self.lock_subscriptions().entries.push(QueueSubscription {
            id,
            subject: subject.to_string(),
            queue_group: queue_group.to_string(),
            callback,
        });
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, BoxError> {
        let mut subscriptions = self.lock_subscriptions();
        let before = subscriptions.entries.len();
        subscriptions.entries.retain(|entry| entry.id != id);
        Ok(subscriptions.entries.len() != before)
    }
}
