//! Content identity for configuration blobs.
//!
//! A blob's identity is derived from its bytes, never assigned: two blobs
//! with equal bytes always have equal ids. The id doubles as the cache key
//! on disk and the existence token in a peer's cache manifest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::IdParseError;

/// Width of a content id in bytes (32 hex characters in text form).
pub const CONTENT_ID_LEN: usize = 16;

/// A fixed-width token identifying a configuration blob by its contents.
///
/// The first [`CONTENT_ID_LEN`] bytes of the blob's SHA-256 digest. This
/// identifies *what* the data is; detecting corruption of one particular
/// transmission is [`TransferChecksum`](crate::TransferChecksum)'s job.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId([u8; CONTENT_ID_LEN]);

impl ContentId {
    /// Derive the id of a byte sequence.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut id = [0u8; CONTENT_ID_LEN];
        id.copy_from_slice(&digest[..CONTENT_ID_LEN]);
        Self(id)
    }

    /// Raw id bytes.
    pub fn as_bytes(&self) -> &[u8; CONTENT_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self)
    }
}

impl FromStr for ContentId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != CONTENT_ID_LEN * 2 {
            return Err(IdParseError::BadLength(s.len()));
        }
        let bytes = hex::decode(s).map_err(|_| IdParseError::InvalidHex)?;
        let mut id = [0u8; CONTENT_ID_LEN];
        id.copy_from_slice(&bytes);
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = ContentId::of(b"some configuration bytes");
        let b = ContentId::of(b"some configuration bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_inputs_distinct_ids() {
        let a = ContentId::of(b"world one");
        let b = ContentId::of(b"world two");
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let id = ContentId::of(b"roundtrip");
        let text = id.to_string();
        assert_eq!(text.len(), CONTENT_ID_LEN * 2);
        assert_eq!(text, text.to_lowercase());

        let parsed: ContentId = text.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            "abc".parse::<ContentId>(),
            Err(IdParseError::BadLength(3))
        );
        assert_eq!(
            "zz".repeat(16).parse::<ContentId>(),
            Err(IdParseError::InvalidHex)
        );
    }
}
