use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::clock;
use super::codec::{Json, PayloadCodec};
use crate::error::{Error, ErrorKind, Result};
use crate::metadata::Metadata;
use crate::subject;

/// Immutable event envelope.
///
/// Every field is validated on construction, so an `Event` value is always
/// complete: non-empty id and entity id, a concrete topic and a non-empty
/// serialized payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    id: String,
    entity_id: String,
    topic: String,
    payload: Vec<u8>,
    timestamp: DateTime<Utc>,
}

impl Event {
    /// Build an event from already-serialized parts.
    ///
    /// Fails with [`ErrorKind::InvalidEvent`] when a field is empty or the
    /// topic is not a concrete dot-delimited topic. The error metadata names
    /// the offending `field` and echoes every input.
    pub fn new(
        id: impl Into<String>,
        entity_id: impl Into<String>,
        topic: impl Into<String>,
        payload: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let event = Self {
            id: id.into(),
            entity_id: entity_id.into(),
            topic: topic.into(),
            payload,
            timestamp,
        };

        if event.id.is_empty() {
            return Err(event.invalid("id", "event id is empty"));
        }

        if event.entity_id.is_empty() {
            return Err(event.invalid("entity_id", "event entity_id is empty"));
        }

        if event.topic.is_empty() {
            return Err(event.invalid("topic", "event topic is empty"));
        }

        if let Err(err) = subject::validate_topic(&event.topic) {
            let message = format!("event topic is invalid ({})", err);
            return Err(event.invalid("topic", message).with_source(err));
        }

        if event.payload.is_empty() {
            return Err(event.invalid("payload", "event payload is empty"));
        }

        Ok(event)
    }

    /// Create a fresh event for `entity_id` with a JSON payload.
    pub fn create<P>(
        entity_id: impl Into<String>,
        topic: impl Into<String>,
        payload: &P,
    ) -> Result<Self>
    where
        P: Serialize + ?Sized,
    {
        Self::create_with::<Json, P>(entity_id, topic, payload)
    }

    /// Create a fresh event, serializing the payload with codec `C`.
    ///
    /// A new v4 UUID becomes the id and the process-monotonic clock supplies
    /// the timestamp. A codec that encodes the payload to zero bytes (bitcode
    /// does for `()`) fails with [`ErrorKind::PayloadSerialization`].
    pub fn create_with<C, P>(
        entity_id: impl Into<String>,
        topic: impl Into<String>,
        payload: &P,
    ) -> Result<Self>
    where
        C: PayloadCodec,
        P: Serialize + ?Sized,
    {
        let entity_id = entity_id.into();
        let topic = topic.into();

        let bytes = C::encode(payload).map_err(|err| {
            Error::wrap(
                ErrorKind::PayloadSerialization,
                err,
                "could not serialize event payload",
            )
            .with_metadata(
                Metadata::with("entity_id", &entity_id)
                    .and("topic", &topic)
                    .and("codec", C::NAME),
            )
        })?;

        if bytes.is_empty() {
            return Err(Error::new(
                ErrorKind::PayloadSerialization,
                "event payload serialized to zero bytes",
            )
            .with_metadata(
                Metadata::with("entity_id", &entity_id)
                    .and("topic", &topic)
                    .and("codec", C::NAME),
            ));
        }

        Self::new(
            Uuid::new_v4().to_string(),
            entity_id,
            topic,
            bytes,
            clock::now(),
        )
    }

    /// Decode the JSON payload into `T`.
    pub fn unmarshal_payload<T: DeserializeOwned>(&self) -> Result<T> {
        self.unmarshal_payload_with::<Json, T>()
    }

    /// Decode the payload into `T` with codec `C`.
    pub fn unmarshal_payload_with<C, T>(&self) -> Result<T>
    where
        C: PayloadCodec,
        T: DeserializeOwned,
    {
        C::decode(&self.payload).map_err(|err| {
            Error::wrap(
                ErrorKind::PayloadDeserialization,
                err,
                "could not deserialize event payload",
            )
            .with_metadata(
                Metadata::with("id", &self.id)
                    .and("entity_id", &self.entity_id)
                    .and("topic", &self.topic)
                    .and("codec", C::NAME),
            )
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    fn invalid(&self, field: &str, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::InvalidEvent, message).with_metadata(
            Metadata::with("field", field)
                .and("id", &self.id)
                .and("entity_id", &self.entity_id)
                .and("topic", &self.topic)
                .and("payload", String::from_utf8_lossy(&self.payload))
                .and(
                    "timestamp",
                    self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ),
        )
    }
}
