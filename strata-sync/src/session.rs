//! Per-connection sync session state.
//!
//! One [`SessionHandle`] per connection, held in a [`Sessions`] map owned
//! by the connection-management layer and passed explicitly into the
//! coordinators. Created on connection establishment, dropped on
//! disconnection, never shared across connections.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use strata_store::CacheManifest;

use crate::protocol::Message;

/// Unique identifier for a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub u64);

impl PeerId {
    /// Create a new peer ID from a counter value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// What a peer reported in its hello.
#[derive(Debug, Clone)]
pub struct HandshakeInfo {
    /// The peer's mod version.
    pub version: String,
    /// The peer's cache manifest, a read-only snapshot.
    pub manifest: CacheManifest,
}

#[derive(Debug)]
struct SessionShared {
    hello: Mutex<Option<HandshakeInfo>>,
    hello_tx: watch::Sender<bool>,
    ready_tx: watch::Sender<bool>,
}

/// Handle to one connection's sync state.
///
/// Cheap to clone; the message-handler side records what the peer reports
/// while the coordinator side awaits it.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    peer: PeerId,
    shared: Arc<SessionShared>,
}

impl SessionHandle {
    /// Create state for a newly established connection.
    pub fn new(peer: PeerId) -> Self {
        Self {
            peer,
            shared: Arc::new(SessionShared {
                hello: Mutex::new(None),
                hello_tx: watch::channel(false).0,
                ready_tx: watch::channel(false).0,
            }),
        }
    }

    /// The connection this session belongs to.
    pub fn peer(&self) -> PeerId {
        self.peer
    }

    /// Record the peer's hello.
    pub fn record_hello(&self, version: String, manifest: CacheManifest) {
        tracing::debug!(
            peer = %self.peer,
            version = %version,
            cached = manifest.len(),
            "received peer handshake"
        );
        *self.shared.hello.lock().expect("session lock poisoned") = Some(HandshakeInfo {
            version,
            manifest,
        });
        self.shared.hello_tx.send_replace(true);
    }

    /// The recorded hello, if the peer has sent one.
    pub fn hello(&self) -> Option<HandshakeInfo> {
        self.shared
            .hello
            .lock()
            .expect("session lock poisoned")
            .clone()
    }

    /// Mark the peer ready for the next connection phase.
    pub fn mark_ready(&self) {
        tracing::debug!(peer = %self.peer, "peer is ready for session handshake");
        self.shared.ready_tx.send_replace(true);
    }

    /// Whether the peer has signalled ready.
    pub fn is_ready(&self) -> bool {
        *self.shared.ready_tx.borrow()
    }

    /// Feed an incoming message into the session record.
    ///
    /// Only `Hello` and `Ready` carry session state; anything else from a
    /// client is a protocol violation worth logging, not acting on.
    pub fn apply(&self, message: Message) {
        match message {
            Message::Hello(hello) => self.record_hello(hello.version, hello.manifest),
            Message::Ready => self.mark_ready(),
            other => {
                tracing::warn!(
                    peer = %self.peer,
                    message = other.name(),
                    "ignoring unexpected message from client"
                );
            }
        }
    }

    /// Suspend until the peer has sent its hello.
    pub async fn hello_received(&self) {
        let mut rx = self.shared.hello_tx.subscribe();
        let _ = rx.wait_for(|received| *received).await;
    }

    /// Suspend until the peer signals ready.
    pub async fn ready(&self) {
        let mut rx = self.shared.ready_tx.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

/// Owned map from connection identity to session state.
///
/// Held by whichever component manages connections; handlers and
/// coordinators receive cloned [`SessionHandle`]s, never this map.
#[derive(Debug, Default)]
pub struct Sessions {
    inner: HashMap<PeerId, SessionHandle>,
}

impl Sessions {
    /// Create an empty session map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh session for `peer`, discarding any stale one left over
    /// from a previous connection with the same identity.
    pub fn open(&mut self, peer: PeerId) -> SessionHandle {
        let session = SessionHandle::new(peer);
        self.inner.insert(peer, session.clone());
        session
    }

    /// Look up the session for `peer`.
    pub fn get(&self, peer: PeerId) -> Option<&SessionHandle> {
        self.inner.get(&peer)
    }

    /// Drop the session for `peer` on disconnection.
    pub fn close(&mut self, peer: PeerId) {
        self.inner.remove(&peer);
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HelloMessage;

    #[test]
    fn test_record_hello() {
        let session = SessionHandle::new(PeerId::new(1));
        assert!(session.hello().is_none());

        session.apply(Message::Hello(HelloMessage {
            version: "0.1.0".into(),
            manifest: CacheManifest::empty(),
        }));

        let hello = session.hello().unwrap();
        assert_eq!(hello.version, "0.1.0");
        assert!(hello.manifest.is_empty());
    }

    #[test]
    fn test_ready_flag() {
        let session = SessionHandle::new(PeerId::new(1));
        assert!(!session.is_ready());

        session.apply(Message::Ready);
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_ready_wakes_waiter() {
        let session = SessionHandle::new(PeerId::new(1));
        let waiter = session.clone();

        let handle = tokio::spawn(async move { waiter.ready().await });
        session.mark_ready();
        handle.await.unwrap();
    }

    #[test]
    fn test_sessions_open_replaces_stale() {
        let mut sessions = Sessions::new();
        let first = sessions.open(PeerId::new(7));
        first.mark_ready();

        let second = sessions.open(PeerId::new(7));
        assert_eq!(sessions.len(), 1);
        assert!(!second.is_ready());
        assert!(!sessions.get(PeerId::new(7)).unwrap().is_ready());

        sessions.close(PeerId::new(7));
        assert!(sessions.is_empty());
    }
}
