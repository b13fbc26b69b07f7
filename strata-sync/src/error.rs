//! Sync error types.
//!
//! Every variant maps to disconnecting the single affected peer with a
//! distinguishable status; nothing is retried within the same connection.
//! The `Display` output is the human-readable reason retained for the user,
//! whose remedy is always to reconnect (which restarts the protocol from
//! the hello).

use thiserror::Error;

use strata_core::{CodecError, ContentId};
use strata_store::StoreError;

/// Errors that can occur during peer synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The peer never sent its hello; it runs an incompatible or missing
    /// client.
    #[error("peer sent no handshake; its client mod is missing or too old to talk to")]
    HandshakeMissing,

    /// Host and client versions differ for a world that requires agreement.
    #[error("world has generation override enabled, but server version {server} and client version {client} don't match")]
    VersionMismatch {
        /// Version the host reported (or "unknown" when the host aborted
        /// before telling us).
        server: String,
        /// Version the client reported.
        client: String,
    },

    /// The peer's receive queue never drained; it was dropped to bound
    /// buffered output.
    #[error("timed out streaming configuration to the peer, its receive queue never drained")]
    TransferTimeout,

    /// A chunk's recomputed checksum did not match its declared checksum.
    #[error("configuration chunk at offset {offset} was corrupted in transfer, please reconnect")]
    ChunkCorrupt {
        /// Offset of the corrupted chunk.
        offset: u64,
    },

    /// A chunk landed outside the announced transfer size.
    #[error("chunk at offset {offset} overflows the announced {total} byte transfer")]
    ChunkOverflow {
        /// Offset of the offending chunk.
        offset: u64,
        /// Announced total transfer size.
        total: u64,
    },

    /// The fully-received blob's checksum did not match the announced one.
    #[error("configuration was corrupted during transfer, please reconnect")]
    BlobCorrupt,

    /// A claimed-cached entry turned out absent or corrupt.
    #[error("cached configuration {id} failed to load, please reconnect to download it again")]
    CacheMiss {
        /// The id the host instructed us to load.
        id: ContentId,
    },

    /// The peer vanished mid-protocol.
    #[error("peer disconnected during synchronization")]
    Disconnected,

    /// The peer sent a message the current state does not accept.
    #[error("unexpected {message} message while {state}")]
    UnexpectedMessage {
        /// What the receiving state machine was doing.
        state: &'static str,
        /// Name of the offending message.
        message: &'static str,
    },

    /// Content store failure.
    #[error("content store error: {0}")]
    Store(#[from] StoreError),

    /// Encoding or decoding failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The transport refused a send.
    #[error("transport error: {0}")]
    Transport(String),

    /// A background hash/decode task failed to complete.
    #[error("background task failed: {0}")]
    Background(String),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
