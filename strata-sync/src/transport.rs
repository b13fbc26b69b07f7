//! The transport seam.
//!
//! The underlying message channel is externally provided and assumed
//! ordered, reliable, and connection-oriented. It exposes only "send a
//! message", the depth of its outgoing queue, and connection teardown;
//! everything else about framing and delivery is its business.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::protocol::Message;
use crate::session::PeerId;

/// Why a connection was closed.
///
/// `ConnectFailed` is the dedicated connect-failure status: it tells the
/// remote side to present a retry prompt rather than a generic
/// disconnection error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectStatus {
    /// Ordinary teardown.
    Normal,
    /// Connection setup failed; the user should be prompted to reconnect.
    ConnectFailed,
}

/// One connection's message channel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identity of the peer on the other end.
    fn peer(&self) -> PeerId;

    /// Queue a message for delivery.
    fn send(&self, message: Message) -> SyncResult<()>;

    /// Bytes currently staged in the outgoing queue.
    fn queue_depth(&self) -> usize;

    /// Whether the connection is still up.
    fn is_connected(&self) -> bool;

    /// Suspend until the outgoing queue drops below `threshold` bytes.
    async fn wait_queue_below(&self, threshold: usize);

    /// Suspend until the connection drops.
    async fn closed(&self);

    /// Tear the connection down with the given status.
    fn disconnect(&self, status: DisconnectStatus);
}
