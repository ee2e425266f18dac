//! Payload codecs.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BoxError;

/// Turns typed payloads into envelope bytes and back.
///
/// The envelope only ever stores bytes; the codec is chosen by the producer
/// and must be matched by the consumer.
pub trait PayloadCodec {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BoxError>;

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BoxError>;
}

/// Self-describing JSON. Default codec, readable by producers in any language.
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl PayloadCodec for Json {
    const NAME: &'static str = "json";

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BoxError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BoxError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Compact binary encoding for Rust-only producers and consumers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bitcode;

impl PayloadCodec for Bitcode {
    const NAME: &'static str = "bitcode";

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BoxError> {
        Ok(bitcode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BoxError> {
        Ok(bitcode::deserialize(bytes)?)
    }
}
