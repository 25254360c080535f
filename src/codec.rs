//! Value serialization for the disk tier.
//!
//! Spilled values are stored as exactly their encoded bytes, no header or
//! metadata. The codec is pluggable so callers can swap the wire format;
//! [`JsonCodec`] is the default and round-trips anything serde can.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to encode value: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to decode persisted bytes: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode/decode seam between the in-memory value type and the on-disk bytes.
///
/// Contract: `decode(encode(v))` is structurally equal to `v` for every value
/// the cache is asked to store, and `decode` on malformed input reports a
/// [`DecodeError`] rather than a partially-formed value.
pub trait Codec<V> {
    fn encode(&self, value: &V) -> Result<Vec<u8>, EncodeError>;
    fn decode(&self, bytes: &[u8]) -> Result<V, DecodeError>;
}

/// serde_json codec, usable with any serde-derived value type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<V> Codec<V> for JsonCodec
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<V, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
