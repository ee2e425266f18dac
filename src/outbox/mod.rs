//! Outbox: collect events during a unit of work, publish them afterwards.
//!
//! ```
//! use serde::Serialize;
//! use sourced_bus::bus::{handler_fn, LocalBus, Subscriber};
//! use sourced_bus::{EventCollector, Publishable};
//!
//! #[derive(Serialize)]
//! struct OrderPlaced {
//!     order_id: String,
//! }
//!
//! impl Publishable for OrderPlaced {
//!     fn entity_id(&self) -> &str {
//!         &self.order_id
//!     }
//!
//!     fn topic(&self) -> &str {
//!         "orders.placed"
//!     }
//! }
//!
//! let bus = LocalBus::new();
//! bus.subscribe("orders.*", handler_fn(|_event| Ok(()))).unwrap();
//!
//! let mut collector = EventCollector::new();
//! collector.record(&OrderPlaced { order_id: "order#1".into() }).unwrap();
//!
//! let result = collector.flush(&bus).unwrap();
//! assert_eq!(result.published, 1);
//! assert!(collector.is_empty());
//! ```

mod collector;
mod publishable;
mod shared;

pub use collector::{EventCollector, FlushResult};
pub use publishable::Publishable;
pub use shared::SharedCollector;
