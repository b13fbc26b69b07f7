//! Chunked transfer assembly and verification.
//!
//! Integrity is two-tier: each chunk carries its own checksum (localizes
//! corruption for diagnostics), and the whole blob carries one verified
//! after the final chunk. Either mismatch is fatal for the connection.

use strata_core::TransferChecksum;

use crate::error::{SyncError, SyncResult};
use crate::protocol::TransferChunkMessage;

/// Accumulates an in-progress chunked receive into one contiguous blob.
///
/// Created when a transfer starts, consumed when every byte has arrived
/// and the whole-blob checksum matches; discarded on any mismatch.
#[derive(Debug)]
pub struct TransferBuffer {
    expected: TransferChecksum,
    buf: Vec<u8>,
    received: usize,
}

impl TransferBuffer {
    /// Allocate a buffer for an announced transfer.
    pub fn new(total_bytes: u64, checksum: TransferChecksum) -> Self {
        Self {
            expected: checksum,
            buf: vec![0; total_bytes as usize],
            received: 0,
        }
    }

    /// Announced size of the transfer.
    pub fn expected_len(&self) -> usize {
        self.buf.len()
    }

    /// Bytes received so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Whether every announced byte has arrived.
    pub fn is_complete(&self) -> bool {
        self.received == self.buf.len()
    }

    /// Verify and copy in one chunk. Returns whether the transfer is now
    /// complete.
    pub fn accept(&mut self, chunk: &TransferChunkMessage) -> SyncResult<bool> {
        if TransferChecksum::of(&chunk.bytes) != chunk.checksum {
            return Err(SyncError::ChunkCorrupt {
                offset: chunk.offset,
            });
        }

        let offset = chunk.offset as usize;
        let end = offset
            .checked_add(chunk.bytes.len())
            .filter(|&end| end <= self.buf.len())
            .ok_or(SyncError::ChunkOverflow {
                offset: chunk.offset,
                total: self.buf.len() as u64,
            })?;

        self.buf[offset..end].copy_from_slice(&chunk.bytes);
        self.received += chunk.bytes.len();
        Ok(self.is_complete())
    }

    /// Verify the whole-blob checksum and yield the assembled bytes.
    pub fn finish(self) -> SyncResult<Vec<u8>> {
        if TransferChecksum::of(&self.buf) != self.expected {
            return Err(SyncError::BlobCorrupt);
        }
        Ok(self.buf)
    }
}

/// Split a blob into fixed-size, in-order chunks covering `[0, len)`
/// exactly once, each carrying its own checksum.
pub fn chunks(bytes: &[u8], chunk_size: usize) -> impl Iterator<Item = TransferChunkMessage> + '_ {
    bytes
        .chunks(chunk_size)
        .enumerate()
        .map(move |(index, chunk)| TransferChunkMessage {
            offset: (index * chunk_size) as u64,
            checksum: TransferChecksum::of(chunk),
            bytes: chunk.to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_chunks_cover_blob_exactly_once() {
        let data = blob(1000);
        let parts: Vec<_> = chunks(&data, 256).collect();

        assert_eq!(parts.len(), 4);
        let mut expected_offset = 0u64;
        for part in &parts {
            // In order, gap-free, no overlaps
            assert_eq!(part.offset, expected_offset);
            expected_offset += part.bytes.len() as u64;
        }
        assert_eq!(expected_offset, data.len() as u64);

        let total: usize = parts.iter().map(|p| p.bytes.len()).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_assemble_roundtrip() {
        let data = blob(700);
        let whole = TransferChecksum::of(&data);

        let mut buffer = TransferBuffer::new(data.len() as u64, whole);
        for chunk in chunks(&data, 128) {
            buffer.accept(&chunk).unwrap();
        }
        assert!(buffer.is_complete());
        assert_eq!(buffer.finish().unwrap(), data);
    }

    #[test]
    fn test_corrupt_chunk_rejected() {
        let data = blob(300);
        let mut buffer = TransferBuffer::new(data.len() as u64, TransferChecksum::of(&data));

        let mut chunk = chunks(&data, 300).next().unwrap();
        chunk.bytes[5] ^= 0xFF; // corrupted in transit, checksum now stale

        assert!(matches!(
            buffer.accept(&chunk),
            Err(SyncError::ChunkCorrupt { offset: 0 })
        ));
        assert_eq!(buffer.received(), 0);
    }

    #[test]
    fn test_chunk_overflow_rejected() {
        let mut buffer = TransferBuffer::new(10, TransferChecksum::of(&[]));
        let bytes = vec![1u8; 8];
        let chunk = TransferChunkMessage {
            offset: 5,
            checksum: TransferChecksum::of(&bytes),
            bytes,
        };

        assert!(matches!(
            buffer.accept(&chunk),
            Err(SyncError::ChunkOverflow { offset: 5, total: 10 })
        ));
    }

    #[test]
    fn test_whole_blob_mismatch_rejected() {
        let data = blob(200);
        // Announce a checksum that cannot match the assembled bytes
        let mut buffer = TransferBuffer::new(data.len() as u64, TransferChecksum::of(b"other"));
        for chunk in chunks(&data, 64) {
            buffer.accept(&chunk).unwrap();
        }
        assert!(buffer.is_complete());
        assert!(matches!(buffer.finish(), Err(SyncError::BlobCorrupt)));
    }

    #[test]
    fn test_progress_reporting() {
        let data = blob(512);
        let mut buffer = TransferBuffer::new(data.len() as u64, TransferChecksum::of(&data));
        let mut parts = chunks(&data, 256);

        let complete = buffer.accept(&parts.next().unwrap()).unwrap();
        assert!(!complete);
        assert_eq!(buffer.received(), 256);

        let complete = buffer.accept(&parts.next().unwrap()).unwrap();
        assert!(complete);
    }
}
