//! Sending side of the sync protocol.
//!
//! Runs once per peer, right before the gated session handshake step:
//! precondition checks, then the cache-hit fast path or the chunked slow
//! path under backpressure. Every failure aborts only the affected peer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::timeout;

use strata_core::{CodecError, ContentId, TransferChecksum, WorldConfig};

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{AbortReason, Message, TransferStartMessage};
use crate::session::SessionHandle;
use crate::transfer;
use crate::transport::{DisconnectStatus, Transport};

/// The host's immutable distribution payload for the currently loaded
/// world: the encoded configuration plus its precomputed identity.
#[derive(Debug, Clone)]
pub struct HostWorld {
    bytes: Arc<Vec<u8>>,
    id: ContentId,
    checksum: TransferChecksum,
    enabled: bool,
}

impl HostWorld {
    /// Finalize a configuration for distribution.
    pub fn new(config: &WorldConfig) -> Result<Self, CodecError> {
        Ok(Self::from_encoded(config.encode()?, config.enabled))
    }

    /// Wrap an already-encoded configuration blob.
    pub fn from_encoded(bytes: Vec<u8>, enabled: bool) -> Self {
        let id = ContentId::of(&bytes);
        let checksum = TransferChecksum::of(&bytes);
        Self {
            bytes: Arc::new(bytes),
            id,
            checksum,
            enabled,
        }
    }

    /// Content id of the distributed blob.
    pub fn id(&self) -> ContentId {
        self.id
    }

    /// Whether generation override is enabled for this world.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Size of the encoded blob.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoded blob is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The encoded blob.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Send an abort to the peer and drop it with a connect-failure status.
fn abort(transport: &dyn Transport, reason: AbortReason, error: SyncError) -> SyncError {
    let _ = transport.send(Message::Abort(reason));
    transport.disconnect(DisconnectStatus::ConnectFailed);
    error
}

/// Synchronize one peer with the world's configuration.
///
/// Precondition checks run in order, each terminal: no recorded hello
/// means the peer runs an incompatible or missing client; a version
/// mismatch gets its own wire code so the client can show a specific
/// diagnostic. Otherwise the peer is served the fast path (its manifest
/// already names our blob) or the full chunked transfer.
pub async fn sync_peer(
    session: &SessionHandle,
    transport: &dyn Transport,
    world: &HostWorld,
    config: &SyncConfig,
) -> SyncResult<()> {
    let peer = transport.peer();

    let Some(hello) = session.hello() else {
        tracing::warn!(%peer, "no handshake recorded, peer's client mod is missing or too old");
        return Err(abort(
            transport,
            AbortReason::HandshakeMissing,
            SyncError::HandshakeMissing,
        ));
    };

    if hello.version != config.version {
        tracing::warn!(
            %peer,
            client = %hello.version,
            server = %config.version,
            "client version doesn't match"
        );
        return Err(abort(
            transport,
            AbortReason::VersionMismatch,
            SyncError::VersionMismatch {
                server: config.version.clone(),
                client: hello.version,
            },
        ));
    }
    tracing::debug!(%peer, version = %hello.version, "client version matches");

    // Bilateral version agreement: the client re-checks this after it has
    // the configuration and knows whether the world requires it.
    transport.send(Message::ServerVersion(config.version.clone()))?;

    if hello.manifest.contains(&world.id()) {
        tracing::info!(%peer, id = %world.id(), "peer has configuration cached, instructing local load");
        transport.send(Message::LoadFromCache(world.id()))?;
        return Ok(());
    }

    tracing::info!(
        %peer,
        id = %world.id(),
        total = world.len(),
        "peer has no cached configuration, streaming it"
    );
    transport.send(Message::TransferStart(TransferStartMessage {
        total_bytes: world.len() as u64,
        checksum: world.checksum,
    }))?;

    let mut sent = 0usize;
    for chunk in transfer::chunks(world.bytes(), config.chunk_size) {
        sent += chunk.bytes.len();
        transport.send(Message::TransferChunk(chunk))?;
        tracing::debug!(%peer, sent, total = world.len(), "sent configuration chunk");

        // Backpressure: the queue must drain below one chunk before the
        // next goes out, or this peer is cut loose. Only this peer's task
        // suspends here.
        let drained = timeout(
            config.stall_timeout,
            transport.wait_queue_below(config.chunk_size),
        )
        .await;
        if drained.is_err() {
            tracing::warn!(
                %peer,
                timeout = ?config.stall_timeout,
                "peer's receive queue never drained, dropping it"
            );
            return Err(abort(
                transport,
                AbortReason::TransferTimeout,
                SyncError::TransferTimeout,
            ));
        }
    }

    Ok(())
}

/// Host-side message pump for one connection: feeds the peer's hello and
/// ready signals into its session record.
pub async fn serve_session(session: SessionHandle, mut incoming: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = incoming.recv().await {
        session.apply(message);
    }
}
