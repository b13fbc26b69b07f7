//! # Strata Sync
//!
//! Keeps the authoritative world-generation configuration consistent
//! between a hosting peer and its connecting peers: version handshake,
//! content-addressed caching of previously-received blobs, chunked
//! hash-verified transfer of blobs not already cached, and the gate that
//! blocks a peer's session handshake until synchronization completes or
//! fails.
//!
//! # Architecture
//!
//! One cooperative task per phase per connection; different connections'
//! sync phases interleave freely and share nothing but the content store.
//!
//! ```text
//! client                                host
//! ──────                                ────
//! Hello(version, manifest)  ──────────▶  record session
//!                                        gate intercepts peer-info step
//!                           ◀──────────  ServerVersion(version)
//!          fast path        ◀──────────  LoadFromCache(id)
//!          slow path        ◀──────────  TransferStart + TransferChunk…
//! verify, persist, apply
//! Ready                     ──────────▶  gate releases peer-info step
//! ```
//!
//! The transport is externally provided: it only exposes "send a message"
//! and a send-queue depth, over an ordered, reliable, connection-oriented
//! channel.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod host;
pub mod protocol;
pub mod session;
pub mod transfer;
pub mod transport;

// Re-export main types
pub use client::{ClientSync, SyncPhase};
pub use config::{SyncConfig, DEFAULT_CHUNK_SIZE, DEFAULT_STALL_TIMEOUT, LOCAL_VERSION};
pub use error::{SyncError, SyncResult};
pub use gate::Gate;
pub use host::HostWorld;
pub use protocol::{AbortReason, Message};
pub use session::{PeerId, SessionHandle, Sessions};
pub use transfer::TransferBuffer;
pub use transport::{DisconnectStatus, Transport};
