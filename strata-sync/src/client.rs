//! Receiving side of the sync protocol.
//!
//! Drives the state machine from hello through verification to ready.
//! Hashing, cache verification, and configuration decoding run on the
//! blocking executor so they never stall other connections' message
//! processing. There is no receiver-side timeout: the only entity that can
//! stall us is the host, and the host times out on its own.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task;

use strata_core::{ContentId, WorldConfig};
use strata_store::ContentStore;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{AbortReason, Message, TransferStartMessage};
use crate::transfer::TransferBuffer;
use crate::transport::{DisconnectStatus, Transport};

/// Client-side sync phase, reported through the progress channel.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncPhase {
    /// Nothing has happened yet.
    Idle,
    /// Hello sent, waiting for the host's decision.
    AwaitingDecision,
    /// Receiving a chunked transfer.
    Receiving {
        /// Bytes received so far.
        received: u64,
        /// Announced total.
        total: u64,
    },
    /// All bytes received, verifying the whole blob.
    Verifying,
    /// Decoding and applying the configuration.
    Applying,
    /// Synchronization finished, the session may proceed.
    Ready,
    /// Synchronization failed; the connection is being dropped.
    Failed {
        /// Human-readable reason, retained for the next connection attempt.
        reason: String,
    },
}

impl SyncPhase {
    /// Download progress as a percentage, where meaningful.
    pub fn percent(&self) -> Option<f64> {
        match self {
            SyncPhase::Receiving { received, total } if *total > 0 => {
                Some((*received as f64 / *total as f64) * 100.0)
            }
            SyncPhase::Receiving { .. } => Some(100.0),
            SyncPhase::Ready => Some(100.0),
            _ => None,
        }
    }

    /// Whether this phase ends the sync.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncPhase::Ready | SyncPhase::Failed { .. })
    }
}

/// Server version assumed when the host never announced one.
const LEGACY_SERVER_VERSION: &str = "(old)";

/// The receiving-side coordinator for one connection.
pub struct ClientSync {
    store: Arc<ContentStore>,
    config: SyncConfig,
    progress_tx: watch::Sender<SyncPhase>,
}

impl ClientSync {
    /// Create a coordinator over the local content store.
    pub fn new(store: Arc<ContentStore>, config: SyncConfig) -> Self {
        Self {
            store,
            config,
            progress_tx: watch::channel(SyncPhase::Idle).0,
        }
    }

    /// Subscribe to phase/progress updates (feeds the download display).
    pub fn progress(&self) -> watch::Receiver<SyncPhase> {
        self.progress_tx.subscribe()
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.progress_tx.send_replace(phase);
    }

    /// Run the sync to completion, returning the applied configuration.
    ///
    /// On failure the connection is dropped with the connect-failed status
    /// and the error's rendering is the retained user-facing reason.
    pub async fn run(
        &self,
        transport: &dyn Transport,
        incoming: &mut mpsc::UnboundedReceiver<Message>,
    ) -> SyncResult<WorldConfig> {
        let result: SyncResult<WorldConfig> = async {
            let config = self.drive(transport, incoming).await?;
            transport.send(Message::Ready)?;
            Ok(config)
        }
        .await;

        match result {
            Ok(config) => {
                self.set_phase(SyncPhase::Ready);
                Ok(config)
            }
            Err(error) => {
                tracing::error!(peer = %transport.peer(), %error, "synchronization failed");
                self.set_phase(SyncPhase::Failed {
                    reason: error.to_string(),
                });
                if transport.is_connected() {
                    transport.disconnect(DisconnectStatus::ConnectFailed);
                }
                Err(error)
            }
        }
    }

    async fn drive(
        &self,
        transport: &dyn Transport,
        incoming: &mut mpsc::UnboundedReceiver<Message>,
    ) -> SyncResult<WorldConfig> {
        let peer = transport.peer();

        let manifest = self.store.manifest()?;
        tracing::debug!(%peer, cached = manifest.len(), "announcing version and cache contents");
        transport.send(Message::Hello(crate::protocol::HelloMessage {
            version: self.config.version.clone(),
            manifest,
        }))?;
        self.set_phase(SyncPhase::AwaitingDecision);

        let mut server_version: Option<String> = None;

        // Await the host's decision: fast path, slow path, or abort.
        let start = loop {
            let message = incoming.recv().await.ok_or(SyncError::Disconnected)?;
            match message {
                Message::ServerVersion(version) => {
                    tracing::debug!(%peer, server = %version, "received server version");
                    server_version = Some(version);
                }
                Message::LoadFromCache(id) => {
                    return self.load_cached(id, server_version).await;
                }
                Message::TransferStart(start) => break start,
                Message::Abort(reason) => {
                    return Err(self.map_abort(reason));
                }
                other => {
                    return Err(SyncError::UnexpectedMessage {
                        state: "awaiting the host's decision",
                        message: other.name(),
                    });
                }
            }
        };

        let bytes = self
            .receive_transfer(transport, incoming, start, &mut server_version)
            .await?;

        self.set_phase(SyncPhase::Applying);
        let store = Arc::clone(&self.store);
        let config = task::spawn_blocking(move || -> SyncResult<WorldConfig> {
            // Persist first so future reconnections hit the fast path
            let id = store.put(&bytes)?;
            let config = WorldConfig::decode(&bytes)?;
            tracing::info!(%id, "configuration cached and applied");
            Ok(config)
        })
        .await
        .map_err(|e| SyncError::Background(e.to_string()))??;

        self.check_version(&config, server_version)?;
        Ok(config)
    }

    /// Receive a chunked transfer into a buffer and verify it whole.
    async fn receive_transfer(
        &self,
        transport: &dyn Transport,
        incoming: &mut mpsc::UnboundedReceiver<Message>,
        start: TransferStartMessage,
        server_version: &mut Option<String>,
    ) -> SyncResult<Vec<u8>> {
        let peer = transport.peer();
        tracing::info!(%peer, total = start.total_bytes, "receiving configuration from host");

        let mut buffer = TransferBuffer::new(start.total_bytes, start.checksum);
        self.set_phase(SyncPhase::Receiving {
            received: 0,
            total: start.total_bytes,
        });

        while !buffer.is_complete() {
            let message = incoming.recv().await.ok_or(SyncError::Disconnected)?;
            match message {
                Message::TransferChunk(chunk) => {
                    buffer.accept(&chunk)?;
                    tracing::debug!(
                        %peer,
                        received = buffer.received(),
                        total = buffer.expected_len(),
                        "received configuration chunk"
                    );
                    self.set_phase(SyncPhase::Receiving {
                        received: buffer.received() as u64,
                        total: start.total_bytes,
                    });
                }
                Message::ServerVersion(version) => {
                    *server_version = Some(version);
                }
                Message::Abort(reason) => return Err(self.map_abort(reason)),
                other => {
                    return Err(SyncError::UnexpectedMessage {
                        state: "receiving the transfer",
                        message: other.name(),
                    });
                }
            }
        }

        self.set_phase(SyncPhase::Verifying);
        task::spawn_blocking(move || buffer.finish())
            .await
            .map_err(|e| SyncError::Background(e.to_string()))?
    }

    /// Fast path: the host says we already hold the blob.
    ///
    /// A load or verification failure here is unrecoverable in this
    /// connection, since the host offers no retransfer on this path: the
    /// corrupt entry is deleted and the user is asked to reconnect.
    async fn load_cached(
        &self,
        id: ContentId,
        server_version: Option<String>,
    ) -> SyncResult<WorldConfig> {
        tracing::info!(%id, "loading host's configuration from local cache");
        self.set_phase(SyncPhase::Applying);

        let store = Arc::clone(&self.store);
        let loaded = task::spawn_blocking(move || -> SyncResult<WorldConfig> {
            // load re-derives the id from the bytes, catching disk
            // corruption and tampered filenames
            let bytes = store.load(&id)?;
            Ok(WorldConfig::decode(&bytes)?)
        })
        .await
        .map_err(|e| SyncError::Background(e.to_string()))?;

        let config = match loaded {
            Ok(config) => config,
            Err(error) => {
                tracing::error!(%id, %error, "claimed-cached configuration failed to load");
                self.store.delete(&id)?;
                return Err(SyncError::CacheMiss { id });
            }
        };

        self.check_version(&config, server_version)?;
        Ok(config)
    }

    /// Bilateral version agreement, checked only when the world actually
    /// uses generation override: structurally compatible configurations can
    /// still drift in meaning between versions.
    fn check_version(
        &self,
        config: &WorldConfig,
        server_version: Option<String>,
    ) -> SyncResult<()> {
        if !config.enabled {
            tracing::debug!("world doesn't use generation override, skipping version check");
            return Ok(());
        }

        let server = server_version.unwrap_or_else(|| LEGACY_SERVER_VERSION.to_string());
        if server != self.config.version {
            return Err(SyncError::VersionMismatch {
                server,
                client: self.config.version.clone(),
            });
        }
        Ok(())
    }

    /// Turn a wire abort into the retained local diagnostic.
    fn map_abort(&self, reason: AbortReason) -> SyncError {
        match reason {
            AbortReason::HandshakeMissing => SyncError::HandshakeMissing,
            AbortReason::VersionMismatch => SyncError::VersionMismatch {
                server: "unknown".to_string(),
                client: self.config.version.clone(),
            },
            AbortReason::TransferTimeout => SyncError::TransferTimeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_percent() {
        let phase = SyncPhase::Receiving {
            received: 256,
            total: 1024,
        };
        assert_eq!(phase.percent(), Some(25.0));

        assert_eq!(SyncPhase::Ready.percent(), Some(100.0));
        assert_eq!(SyncPhase::Verifying.percent(), None);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(SyncPhase::Ready.is_terminal());
        assert!(SyncPhase::Failed { reason: "x".into() }.is_terminal());
        assert!(!SyncPhase::AwaitingDecision.is_terminal());
    }
}
