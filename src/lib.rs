//! Publish/subscribe event bus.
//!
//! - [`Event`]: immutable, validated envelope with an opaque payload.
//! - [`EventCollector`]: buffers events for a unit of work (outbox).
//! - [`bus`]: the [`Publisher`](bus::Publisher) and
//!   [`Subscriber`](bus::Subscriber) contracts, an in-process
//!   [`LocalBus`](bus::LocalBus) and a transport-backed
//!   [`DistributedBus`](bus::DistributedBus).
//! - [`subject`]: topic validation and wildcard matching.

pub mod bus;
mod error;
mod event;
mod metadata;
mod outbox;
pub mod subject;

pub use error::{BoxError, Error, ErrorKind, Result};
pub use event::{Bitcode, Event, Json, PayloadCodec};
pub use metadata::Metadata;
pub use outbox::{EventCollector, FlushResult, Publishable, SharedCollector};
