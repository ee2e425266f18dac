//! Combined trait for bidirectional bus communication.

use super::publisher::Publisher;
use super::subscriber::Subscriber;

/// Anything that can both publish and subscribe.
///
/// Lets application wiring hold one `Arc<dyn EventBus>` regardless of
/// whether the bus is local or distributed.
pub trait EventBus: Publisher + Subscriber {}

// Blanket implementation
impl<T: Publisher + Subscriber> EventBus for T {}
