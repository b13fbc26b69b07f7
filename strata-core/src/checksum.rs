//! Transfer integrity checksums.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Integrity check over one byte run of a transfer.
///
/// Detects corruption of a particular transmission; a mismatch means this
/// copy of the bytes is bad, not that the content is unknown. Content
/// identity is [`ContentId`](crate::ContentId)'s job, and the two must not
/// be conflated: a checksum mismatch is an expected occasional transport
/// fault, while a content id mismatch on verified data cannot happen by
/// construction.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferChecksum(u32);

impl TransferChecksum {
    /// Compute the checksum of a byte run.
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        Self(u32::from_be_bytes([
            digest[0], digest[1], digest[2], digest[3],
        ]))
    }

    /// The raw checksum value as carried on the wire.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TransferChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::Debug for TransferChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransferChecksum({:08x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(
            TransferChecksum::of(b"chunk data"),
            TransferChecksum::of(b"chunk data")
        );
    }

    #[test]
    fn test_detects_flipped_byte() {
        let good = TransferChecksum::of(b"chunk data");
        let bad = TransferChecksum::of(b"chunk dbta");
        assert_ne!(good, bad);
    }

    #[test]
    fn test_display() {
        let sum = TransferChecksum::of(b"x");
        assert_eq!(sum.to_string().len(), 8);
    }
}
