//! Service Bus - Event publishing and subscription
//!
//! This module provides the publisher/subscriber contracts and two buses
//! that implement them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              EventBus = Publisher + Subscriber               │
//! │  Publisher: publish(events) - ordered, fail-fast            │
//! │  Subscriber: subscribe(subject, handler) / unsubscribe(id)  │
//! └─────────────────────────────────────────────────────────────┘
//!                   │                          │
//!                   ▼                          ▼
//! ┌───────────────────────────┐  ┌───────────────────────────────┐
//! │ LocalBus                  │  │ DistributedBus<T: Transport>  │
//! │ in-process, synchronous   │  │ JSON envelope + queue group   │
//! └───────────────────────────┘  └───────────────────────────────┘
//!                                      │                │
//!                                      ▼                ▼
//!                             ┌─────────────────┐ ┌──────────────┐
//!                             │InMemoryTransport│ │NatsTransport │
//!                             │   (included)    │ │  (`nats`)    │
//!                             └─────────────────┘ └──────────────┘
//! ```
//!
//! ## Subjects
//!
//! Topics are dot-separated lowercase segments (`orders.created`).
//! Subscriptions may use `*` for exactly one segment and a trailing `>` for
//! one or more remaining segments.

mod distributed;
mod event_bus;
mod local;
mod publisher;
mod subscriber;

pub use distributed::{
    DeadLetter, DeadLetterQueue, DeadLetterSink, DistributedBus, InMemoryTransport,
    LogDeadLetters, MessageCallback, Transport, TransportError, TransportMessage, WireEnvelope,
};
#[cfg(feature = "nats")]
pub use distributed::{NatsConfig, NatsTransport};
pub use event_bus::EventBus;
pub use local::LocalBus;
pub use publisher::Publisher;
pub use subscriber::{handler_fn, typed_handler, Handler, Subscriber, SubscriptionId, TypedHandler};
