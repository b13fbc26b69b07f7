//! Sync protocol messages.
//!
//! This module defines the 7 message types exchanged between a hosting peer
//! and a connecting peer during configuration synchronization.

use serde::{Deserialize, Serialize};

use strata_core::{ContentId, TransferChecksum};
use strata_store::CacheManifest;

/// Client's opening announcement: capability and cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    /// The client's mod version.
    pub version: String,
    /// Content ids the client already holds locally.
    pub manifest: CacheManifest,
}

/// Header beginning a slow-path transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStartMessage {
    /// Total size of the blob being transferred.
    pub total_bytes: u64,
    /// Checksum of the whole blob, verified after the final chunk.
    pub checksum: TransferChecksum,
}

/// One chunk of the blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferChunkMessage {
    /// Byte offset of this chunk within the blob.
    pub offset: u64,
    /// Checksum of this chunk alone.
    pub checksum: TransferChecksum,
    /// The chunk's bytes.
    pub bytes: Vec<u8>,
}

/// Why the host aborted a peer's synchronization.
///
/// Carried on the wire so the client can retain a specific diagnostic for
/// its next connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// The host never received the client's hello.
    HandshakeMissing,
    /// Client and host versions differ.
    VersionMismatch,
    /// The client's receive queue never drained.
    TransferTimeout,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::HandshakeMissing => write!(f, "handshake_missing"),
            AbortReason::VersionMismatch => write!(f, "version_mismatch"),
            AbortReason::TransferTimeout => write!(f, "transfer_timeout"),
        }
    }
}

/// All sync protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Client announces its version and cache manifest.
    Hello(HelloMessage),
    /// Host announces its version for the bilateral agreement check.
    ServerVersion(String),
    /// Host instructs the client to load the blob from its local cache.
    LoadFromCache(ContentId),
    /// Host begins a chunked transfer.
    TransferStart(TransferStartMessage),
    /// One chunk of the transfer.
    TransferChunk(TransferChunkMessage),
    /// Client signals the blob is applied and the session may proceed.
    Ready,
    /// Host aborts this peer's synchronization.
    Abort(AbortReason),
}

impl Message {
    /// Get a short name for the message type.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Hello(_) => "hello",
            Message::ServerVersion(_) => "server_version",
            Message::LoadFromCache(_) => "load_from_cache",
            Message::TransferStart(_) => "transfer_start",
            Message::TransferChunk(_) => "transfer_chunk",
            Message::Ready => "ready",
            Message::Abort(_) => "abort",
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Hello(h) => write!(
                f,
                "Hello(version={}, cached={})",
                h.version,
                h.manifest.len()
            ),
            Message::ServerVersion(v) => write!(f, "ServerVersion({})", v),
            Message::LoadFromCache(id) => write!(f, "LoadFromCache({})", id),
            Message::TransferStart(s) => write!(
                f,
                "TransferStart(total={}, checksum={})",
                s.total_bytes, s.checksum
            ),
            Message::TransferChunk(c) => write!(
                f,
                "TransferChunk(offset={}, len={}, checksum={})",
                c.offset,
                c.bytes.len(),
                c.checksum
            ),
            Message::Ready => write!(f, "Ready"),
            Message::Abort(reason) => write!(f, "Abort({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names() {
        assert_eq!(Message::Ready.name(), "ready");
        assert_eq!(
            Message::Abort(AbortReason::VersionMismatch).name(),
            "abort"
        );
        assert_eq!(
            Message::LoadFromCache(ContentId::of(b"x")).name(),
            "load_from_cache"
        );
    }

    #[test]
    fn test_message_display() {
        let msg = Message::TransferChunk(TransferChunkMessage {
            offset: 1024,
            checksum: TransferChecksum::of(b"chunk"),
            bytes: vec![0; 64],
        });
        let text = format!("{}", msg);
        assert!(text.contains("offset=1024"));
        assert!(text.contains("len=64"));
    }

    #[test]
    fn test_wire_encoding_roundtrip() {
        let msg = Message::Hello(HelloMessage {
            version: "0.1.0".into(),
            manifest: CacheManifest::new(vec![ContentId::of(b"a"), ContentId::of(b"b")]),
        });

        let bytes = strata_core::serialization::encode(&msg).unwrap();
        let decoded: Message = strata_core::serialization::decode(&bytes).unwrap();
        assert_eq!(decoded, msg);
    }
}
