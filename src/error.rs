//! Error type shared by every component of the bus.
//!
//! Failures are described by a kind, a human readable message and a bag of
//! diagnostic metadata. Delivery failures additionally carry the event that
//! could not be delivered, so callers can tell which prefix of a batch went
//! out.

use std::fmt;

use thiserror::Error;

use crate::event::Event;
use crate::metadata::Metadata;

/// Boxed error used at the transport and consumer boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classification of a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An event could not be constructed from the given fields.
    InvalidEvent,
    /// A payload could not be serialized into the envelope.
    PayloadSerialization,
    /// An envelope payload could not be decoded into the requested type.
    PayloadDeserialization,
    /// A payload arrived in a representation this crate does not know.
    UnknownPayloadKind,
    /// A wire envelope could not be encoded.
    Serialization,
    /// A wire envelope could not be decoded.
    Deserialization,
    /// The transport refused or failed to send an event.
    Publish,
    /// A subscription could not be registered.
    Subscribe,
    /// A consumer handler reported a failure.
    Handler,
    /// The transport failed outside of publish/subscribe.
    Transport,
}

impl ErrorKind {
    /// Stable dotted code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidEvent => "event.invalid",
            ErrorKind::PayloadSerialization => "event.payload_serialization",
            ErrorKind::PayloadDeserialization => "event.payload_deserialization",
            ErrorKind::UnknownPayloadKind => "event.unknown_payload_kind",
            ErrorKind::Serialization => "event.serialization",
            ErrorKind::Deserialization => "event.deserialization",
            ErrorKind::Publish => "bus.publish",
            ErrorKind::Subscribe => "bus.subscribe",
            ErrorKind::Handler => "bus.handler",
            ErrorKind::Transport => "bus.transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    metadata: Metadata,
    event: Option<Box<Event>>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata: Metadata::new(),
            event: None,
            source: None,
        }
    }

    /// Wrap an underlying error. Its text is appended to the message.
    pub fn wrap<E>(kind: ErrorKind, source: E, message: impl Into<String>) -> Self
    where
        E: Into<BoxError>,
    {
        let source = source.into();
        let message = format!("{} ({})", message.into(), source);
        Self::new(kind, message).with_source(source)
    }

    /// Shorthand for handler implementations.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler, message)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = self.metadata.merge(metadata);
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Some(Box::new(event));
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Name `event` as the one that failed.
    ///
    /// An error that already names a different event (a handler relaying
    /// a failed downstream publish, say) is kept as the source, and its event
    /// id is recorded under `cause_event_id`.
    pub(crate) fn for_event(self, event: &Event) -> Self {
        let cause_event_id = match self.event() {
            None => return self.with_event(event.clone()),
            Some(named) if named.id() == event.id() => return self,
            Some(named) => named.id().to_string(),
        };

        Self {
            kind: self.kind,
            message: self.message.clone(),
            metadata: self
                .metadata
                .clone()
                .merge(Metadata::with("cause_event_id", cause_event_id)),
            event: Some(Box::new(event.clone())),
            source: Some(Box::new(self)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The event whose publication or delivery failed, if any.
    pub fn event(&self) -> Option<&Event> {
        self.event.as_deref()
    }
}
