//! The session-handshake gate.
//!
//! The host's pre-existing peer-info handshake step is intercepted: for a
//! world with generation override enabled it may not run until the peer's
//! configuration is synchronized and applied. Clients need no gate; a
//! client cannot generate terrain before the blob is usable, which
//! serializes things naturally.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::host::{self, HostWorld};
use crate::session::SessionHandle;
use crate::transport::Transport;

/// Blocks the peer-info handshake step until sync completes or fails.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    enabled: bool,
}

impl Gate {
    /// A gate that intercepts when `enabled`, passes through otherwise.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// The gate for the currently loaded world.
    pub fn for_world(world: &HostWorld) -> Self {
        Self::new(world.enabled())
    }

    /// Whether this gate intercepts at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Run sync for one peer and suspend until it may proceed to the
    /// peer-info step.
    ///
    /// For a world without generation override this passes through
    /// immediately; no part of the protocol runs. Otherwise the peer is
    /// synchronized, then held until it signals ready or drops. A dropped
    /// peer is released too; the real handshake step fails on the dead
    /// connection by itself.
    pub async fn admit(
        &self,
        session: &SessionHandle,
        transport: &dyn Transport,
        world: &HostWorld,
        config: &SyncConfig,
    ) -> SyncResult<()> {
        let peer = transport.peer();

        if !self.enabled {
            tracing::debug!(%peer, "world doesn't use generation override, skipping version check and sync");
            return Ok(());
        }

        host::sync_peer(session, transport, world, config).await?;

        tokio::select! {
            _ = session.ready() => {
                tracing::info!(%peer, "peer synchronized, releasing session handshake");
            }
            _ = transport.closed() => {
                tracing::warn!(%peer, "peer dropped while we waited for its ready signal");
            }
        }
        Ok(())
    }
}
