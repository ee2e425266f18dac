//! Distributed bus adapter.
//!
//! Events travel between processes as JSON [`WireEnvelope`]s over a
//! [`Transport`]. [`InMemoryTransport`] is always available; the NATS
//! transport is behind the `nats` feature.

mod bus;
mod dead_letter;
mod in_memory;
#[cfg(feature = "nats")]
mod nats;
mod transport;
mod wire;

pub use bus::DistributedBus;
pub use dead_letter::{DeadLetter, DeadLetterQueue, DeadLetterSink, LogDeadLetters};
pub use in_memory::InMemoryTransport;
#[cfg(feature = "nats")]
pub use nats::{NatsConfig, NatsTransport};
pub use transport::{MessageCallback, Transport, TransportError, TransportMessage};
pub use wire::WireEnvelope;
