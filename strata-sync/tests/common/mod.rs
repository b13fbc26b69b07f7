//! In-memory transport harness for acceptance tests.
//!
//! Simulates one ordered, reliable connection between a host and a client,
//! with a controllable outgoing-queue depth so backpressure behavior can be
//! exercised under simulated time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use strata_sync::protocol::Message;
use strata_sync::{DisconnectStatus, PeerId, SyncError, SyncResult, Transport};

struct LinkShared {
    closed_tx: watch::Sender<bool>,
    status: Mutex<Option<DisconnectStatus>>,
}

/// One endpoint of a simulated connection.
pub struct MemoryTransport {
    peer: PeerId,
    outbound: mpsc::UnboundedSender<Message>,
    link: Arc<LinkShared>,
    queue_bytes: AtomicUsize,
    stalled: AtomicBool,
    sent: Mutex<Vec<Message>>,
}

impl MemoryTransport {
    /// Simulate a receiver that stops draining this endpoint's queue.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Everything this endpoint attempted to send, in order.
    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }

    /// Message names attempted, in order.
    pub fn sent_names(&self) -> Vec<&'static str> {
        self.sent().iter().map(|m| m.name()).collect()
    }

    /// Number of transfer chunks attempted.
    pub fn chunk_count(&self) -> usize {
        self.sent()
            .iter()
            .filter(|m| matches!(m, Message::TransferChunk(_)))
            .count()
    }

    /// Status the connection was closed with, if it was.
    pub fn status(&self) -> Option<DisconnectStatus> {
        *self.link.status.lock().unwrap()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn peer(&self) -> PeerId {
        self.peer
    }

    fn send(&self, message: Message) -> SyncResult<()> {
        if !self.is_connected() {
            return Err(SyncError::Transport("connection closed".into()));
        }
        self.sent.lock().unwrap().push(message.clone());

        if self.stalled.load(Ordering::SeqCst) {
            // Staged but never delivered; the queue only grows
            let size = match &message {
                Message::TransferChunk(c) => c.bytes.len(),
                _ => 64,
            };
            self.queue_bytes.fetch_add(size, Ordering::SeqCst);
            return Ok(());
        }

        let _ = self.outbound.send(message);
        Ok(())
    }

    fn queue_depth(&self) -> usize {
        self.queue_bytes.load(Ordering::SeqCst)
    }

    fn is_connected(&self) -> bool {
        !*self.link.closed_tx.borrow()
    }

    async fn wait_queue_below(&self, threshold: usize) {
        if self.queue_depth() >= threshold {
            // The harness never drains a stalled queue
            std::future::pending::<()>().await;
        }
    }

    async fn closed(&self) {
        let mut rx = self.link.closed_tx.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    fn disconnect(&self, status: DisconnectStatus) {
        let mut recorded = self.link.status.lock().unwrap();
        if recorded.is_none() {
            *recorded = Some(status);
        }
        drop(recorded);
        self.link.closed_tx.send_replace(true);
    }
}

/// A simulated connection: both endpoints plus their incoming queues.
pub struct Link {
    pub host: Arc<MemoryTransport>,
    pub client: Arc<MemoryTransport>,
    pub host_incoming: mpsc::UnboundedReceiver<Message>,
    pub client_incoming: mpsc::UnboundedReceiver<Message>,
}

/// Wire up a host endpoint and a client endpoint as one connection.
pub fn link(peer: u64) -> Link {
    let (to_client, client_incoming) = mpsc::unbounded_channel();
    let (to_host, host_incoming) = mpsc::unbounded_channel();
    let shared = Arc::new(LinkShared {
        closed_tx: watch::channel(false).0,
        status: Mutex::new(None),
    });

    let host = Arc::new(MemoryTransport {
        peer: PeerId::new(peer),
        outbound: to_client,
        link: Arc::clone(&shared),
        queue_bytes: AtomicUsize::new(0),
        stalled: AtomicBool::new(false),
        sent: Mutex::new(Vec::new()),
    });
    let client = Arc::new(MemoryTransport {
        peer: PeerId::new(peer),
        outbound: to_host,
        link: shared,
        queue_bytes: AtomicUsize::new(0),
        stalled: AtomicBool::new(false),
        sent: Mutex::new(Vec::new()),
    });

    Link {
        host,
        client,
        host_incoming,
        client_incoming,
    }
}
