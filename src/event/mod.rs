//! Event envelope.
//!
//! An [`Event`] wraps an arbitrary domain payload in a fixed shape: id,
//! entity id, topic, serialized payload and creation time. Payloads are
//! always stored as bytes; [`PayloadCodec`] decides how typed values become
//! those bytes.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use sourced_bus::Event;
//!
//! #[derive(Serialize, Deserialize)]
//! struct OrderPlaced {
//!     total_cents: u64,
//! }
//!
//! let event = Event::create("order#1", "orders.placed", &OrderPlaced { total_cents: 900 }).unwrap();
//! let placed: OrderPlaced = event.unmarshal_payload().unwrap();
//! assert_eq!(placed.total_cents, 900);
//! ```

mod clock;
mod codec;
mod event;

pub use codec::{Bitcode, Json, PayloadCodec};
pub use event::Event;
