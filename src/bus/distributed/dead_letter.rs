//! Sinks for messages that could not be delivered to a handler.
//!
//! The receive path has no caller to return an error to. Instead of
//! aborting, the distributed bus hands the raw message and the reason to a
//! [`DeadLetterSink`] and keeps consuming.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::error::{Error, ErrorKind};

/// A message the receive path gave up on.
#[derive(Debug)]
pub struct DeadLetter {
    /// Subject the message arrived on.
    pub subject: String,
    /// Raw wire bytes, untouched.
    pub payload: Vec<u8>,
    /// Why it was not delivered. Handler failures keep the handler's error.
    pub error: Error,
}

impl DeadLetter {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

pub trait DeadLetterSink: Send + Sync {
    fn dead_letter(&self, letter: DeadLetter);
}

impl<S: DeadLetterSink + ?Sized> DeadLetterSink for Arc<S> {
    fn dead_letter(&self, letter: DeadLetter) {
        (**self).dead_letter(letter)
    }
}

/// Default sink: log and drop.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDeadLetters;

impl DeadLetterSink for LogDeadLetters {
    fn dead_letter(&self, letter: DeadLetter) {
        log_letter(&letter, "dropping undeliverable message");
    }
}

fn log_letter(letter: &DeadLetter, message: &str) {
    warn!(
        subject = %letter.subject,
        kind = %letter.error.kind(),
        event_id = letter.error.event().map(|event| event.id()),
        payload_len = letter.payload.len(),
        error = %letter.error,
        "{}",
        message
    );
}

/// Keeps dead letters in memory so they can be inspected or replayed.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct DeadLetterQueue {
    letters: Arc<Mutex<Vec<DeadLetter>>>,
}

impl DeadLetterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Kinds of the queued letters, oldest first.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.lock().iter().map(DeadLetter::kind).collect()
    }

    /// Remove and return every queued letter.
    pub fn take(&self) -> Vec<DeadLetter> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DeadLetter>> {
        self.letters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeadLetterSink for DeadLetterQueue {
    fn dead_letter(&self, letter: DeadLetter) {
        log_letter(&letter, "queueing undeliverable message");
        self.lock().push(letter);
    }
}
