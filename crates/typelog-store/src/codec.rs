//! Pluggable payload serialization
//!
//! The logger never inspects payloads. A [`Codec`] turns a value into bytes
//! on append and bytes back into a caller-chosen type on replay.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};

/// Encoder/decoder pair for event payloads
///
/// `decode` must invert `encode` for every type the caller logs.
pub trait Codec: Send + Sync {
    /// Serialize a value into bytes
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<Vec<u8>>;

    /// Deserialize bytes into a value of type `T`
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> StoreResult<T>;
}

/// Compact binary codec using postcard
///
/// Not self-describing: records must be decoded into the same shape they
/// were written with. Encoder errors carry postcard's message, not the
/// one raised by the value's `Serialize` impl.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostcardCodec;

impl Codec for PostcardCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<Vec<u8>> {
        postcard::to_allocvec(value).map_err(StoreError::encode)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> StoreResult<T> {
        postcard::from_bytes(bytes).map_err(StoreError::decode)
    }
}

/// Self-describing codec using JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(StoreError::encode)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> StoreResult<T> {
        serde_json::from_slice(bytes).map_err(StoreError::decode)
    }
}
