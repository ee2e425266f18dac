//! Transport boundary for the distributed bus.

use std::sync::Arc;

use thiserror::Error;

use crate::bus::SubscriptionId;
use crate::error::BoxError;

/// A raw message as seen by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportMessage {
    /// Concrete subject the message was published on.
    pub subject: String,
    pub payload: Vec<u8>,
}

/// Callback the transport invokes for each delivered message.
///
/// Transports may call it from any thread, concurrently.
pub type MessageCallback = Arc<dyn Fn(TransportMessage) + Send + Sync>;

/// Minimal capability the distributed bus needs from a message broker.
///
/// The transport owns subject matching: subscriptions use its wildcard
/// syntax (`*` for one segment, `>` for the tail). Subscribers sharing a
/// queue group on the same subject compete; each message reaches one of them.
pub trait Transport: Send + Sync {
    /// Send `payload` on `subject`.
    fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BoxError>;

    /// Join `queue_group` on `subject`, delivering messages to `callback`.
    fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
        callback: MessageCallback,
    ) -> Result<SubscriptionId, BoxError>;

    /// Leave a subscription. Returns `false` if `id` is unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, BoxError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BoxError> {
        (**self).publish(subject, payload)
    }

    fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
        callback: MessageCallback,
    ) -> Result<SubscriptionId, BoxError> {
        (**self).queue_subscribe(subject, queue_group, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, BoxError> {
        (**self).unsubscribe(id)
    }
}

/// Failures raised by the transports shipped with this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,
}
