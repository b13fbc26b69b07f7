//! Sync protocol configuration.

use std::time::Duration;

/// Default chunk size for configuration transfer (256 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Default per-peer timeout waiting for a stalled receiver's queue to drain.
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Version string announced during the handshake.
///
/// Host and client versions must agree exactly before a configuration is
/// distributed for a world that has generation override enabled.
pub const LOCAL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for both sides of the sync protocol.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Version announced to (and required of) the remote side.
    pub version: String,

    /// Size of each transfer chunk in bytes.
    pub chunk_size: usize,

    /// How long the sending side waits for a peer's send queue to drop
    /// below the chunk size before giving up on that peer.
    pub stall_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            version: LOCAL_VERSION.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
        }
    }
}

impl SyncConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the announced version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the transfer chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the sender-side stall timeout.
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = timeout;
        self
    }
}
