//! Deterministic binary encoding for configuration blobs and wire payloads.
//!
//! Content ids are hashes over encoded bytes, so the encoding must be stable
//! across platforms and releases: fixed-size integers, little-endian byte
//! order, and no trailing bytes accepted on decode.

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Encode a value to its canonical byte representation.
///
/// Equal values always encode to equal bytes, on every platform.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    options()
        .serialize(value)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a value from bytes.
///
/// Fails on malformed input and on trailing bytes after the value.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    options()
        .deserialize(bytes)
        .map_err(|e| CodecError::Decode(e.to_string()))
}
