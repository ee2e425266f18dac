//! Wire envelope exchanged between processes.
//!
//! ```json
//! {
//!   "id": "6f1c…",
//!   "entity_id": "order#1",
//!   "topic": "orders.created",
//!   "payload": "eyJ0b3RhbCI6MTJ9",
//!   "timestamp": "2024-05-01T10:00:00.123456Z"
//! }
//! ```
//!
//! The payload is written as a base64 string. Producers in other languages
//! have sent it as base64, as an array of byte values, or as an inline JSON
//! value; all three are accepted on decode.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};
use crate::event::Event;
use crate::metadata::Metadata;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WireEnvelope {
    pub id: String,
    pub entity_id: String,
    pub topic: String,
    #[serde(serialize_with = "serialize_base64")]
    pub payload: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    id: String,
    entity_id: String,
    topic: String,
    #[serde(default)]
    payload: Value,
    timestamp: DateTime<Utc>,
}

impl WireEnvelope {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id().to_string(),
            entity_id: event.entity_id().to_string(),
            topic: event.topic().to_string(),
            payload: event.payload().to_vec(),
            timestamp: *event.timestamp(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|err| {
            Error::wrap(ErrorKind::Serialization, err, "could not serialize event")
                .with_metadata(Metadata::with("id", &self.id).and("topic", &self.topic))
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_slice(bytes).map_err(|err| {
            Error::wrap(ErrorKind::Deserialization, err, "could not deserialize event")
                .with_metadata(Metadata::with("bytes", bytes.len()))
        })?;

        let payload = payload_bytes(raw.payload).map_err(|err| {
            err.with_metadata(Metadata::with("id", &raw.id).and("topic", &raw.topic))
        })?;

        Ok(Self {
            id: raw.id,
            entity_id: raw.entity_id,
            topic: raw.topic,
            payload,
            timestamp: raw.timestamp,
        })
    }

    /// Rebuild a validated [`Event`].
    pub fn into_event(self) -> Result<Event> {
        Event::new(
            self.id,
            self.entity_id,
            self.topic,
            self.payload,
            self.timestamp,
        )
    }
}

fn serialize_base64<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(payload))
}

fn payload_bytes(value: Value) -> Result<Vec<u8>> {
    match value {
        Value::String(encoded) => BASE64.decode(encoded.as_bytes()).map_err(|err| {
            Error::wrap(
                ErrorKind::Deserialization,
                err,
                "event payload is not valid base64",
            )
        }),
        Value::Array(items) if items.iter().all(is_byte) => Ok(items
            .iter()
            .filter_map(Value::as_u64)
            .map(|byte| byte as u8)
            .collect()),
        Value::Null => Err(Error::new(
            ErrorKind::UnknownPayloadKind,
            "event payload is missing",
        )),
        inline => serde_json::to_vec(&inline).map_err(|err| {
            Error::wrap(
                ErrorKind::Deserialization,
                err,
                "could not re-serialize inline event payload",
            )
        }),
    }
}

fn is_byte(value: &Value) -> bool {
    value.as_u64().is_some_and(|n| n <= u8::MAX as u64)
}
