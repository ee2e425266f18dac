//! Core subscriber and handler traits for the event bus.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::event::Event;

/// Consumer-supplied callback invoked for every matching event.
///
/// Any `Fn(&Event) -> Result<()>` closure is a handler; [`handler_fn`] helps
/// the compiler infer closure signatures.
pub trait Handler: Send + Sync {
    fn handle(&self, event: &Event) -> Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<()> {
        self(event)
    }
}

/// Box a closure as a handler.
pub fn handler_fn<F>(f: F) -> Box<dyn Handler>
where
    F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Handler that decodes the JSON payload before calling `f`.
///
/// A payload that does not decode into `T` fails the handler with
/// [`ErrorKind::PayloadDeserialization`](crate::ErrorKind::PayloadDeserialization)
/// without calling `f`.
pub struct TypedHandler<T, F> {
    f: F,
    _payload: PhantomData<fn() -> T>,
}

impl<T, F> TypedHandler<T, F>
where
    T: DeserializeOwned,
    F: Fn(&Event, T) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _payload: PhantomData,
        }
    }
}

impl<T, F> Handler for TypedHandler<T, F>
where
    T: DeserializeOwned,
    F: Fn(&Event, T) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<()> {
        let payload = event.unmarshal_payload::<T>()?;
        (self.f)(event, payload)
    }
}

/// Box a typed closure as a handler.
pub fn typed_handler<T, F>(f: F) -> Box<dyn Handler>
where
    T: DeserializeOwned + 'static,
    F: Fn(&Event, T) -> Result<()> + Send + Sync + 'static,
{
    Box::new(TypedHandler::new(f))
}

/// Handle returned by [`Subscriber::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Trait for registering handlers against subject patterns.
///
/// Subjects are dot-delimited patterns where `*` stands for exactly one
/// segment and a trailing `>` for the rest (see [`crate::subject`]).
pub trait Subscriber: Send + Sync {
    /// Register `handler` for every event whose topic matches `subject`.
    fn subscribe(&self, subject: &str, handler: Box<dyn Handler>) -> Result<SubscriptionId>;

    /// Remove a registration. Returns `false` if `id` is unknown.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool>;
}
