//! Local Bus Tests
//!
//! In-process publish/subscribe: subject routing, handler ordering,
//! fail-fast batches and typed handlers, all on the publishing thread.

mod dispatch;
mod orders;
