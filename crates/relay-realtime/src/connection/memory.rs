//! In-process connection backed by tokio channels.
//!
//! [`MemoryConnection`] is the relay side; [`MemoryPeer`] plays the remote
//! client. Useful for driving the engine without a socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use super::{Connection, ConnectionError};
use crate::message::types::Frame;

/// Relay side of an in-memory connection.
#[derive(Debug)]
pub struct MemoryConnection {
    /// Frames (or injected failures) written by the peer
    inbound: Mutex<mpsc::UnboundedReceiver<Result<Frame, ConnectionError>>>,
    /// Frames delivered to the peer
    outbound: mpsc::UnboundedSender<Frame>,
    /// Set once `close` has been called
    closed: Arc<AtomicBool>,
}

/// Remote side of an in-memory connection.
#[derive(Debug)]
pub struct MemoryPeer {
    inbound: mpsc::UnboundedSender<Result<Frame, ConnectionError>>,
    outbound: mpsc::UnboundedReceiver<Frame>,
    closed: Arc<AtomicBool>,
}

impl MemoryConnection {
    /// Create a connected pair.
    pub fn pair() -> (Self, MemoryPeer) {
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let connection = Self {
            inbound: Mutex::new(in_rx),
            outbound: out_tx,
            closed: closed.clone(),
        };
        let peer = MemoryPeer {
            inbound: in_tx,
            outbound: out_rx,
            closed,
        };

        (connection, peer)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn receive(&self) -> Result<Frame, ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        let mut inbound = self.inbound.lock().await;
        match inbound.recv().await {
            Some(result) => result,
            None => Err(ConnectionError::Closed),
        }
    }

    async fn send(&self, frame: Frame) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        self.outbound
            .send(frame)
            .map_err(|_| ConnectionError::Closed)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl MemoryPeer {
    /// Send a frame to the relay. Returns `false` if the relay side is gone.
    pub fn send(&self, frame: Frame) -> bool {
        self.inbound.send(Ok(frame)).is_ok()
    }

    /// Make the relay's next read fail with `error`.
    pub fn fail(&self, error: ConnectionError) -> bool {
        self.inbound.send(Err(error)).is_ok()
    }

    /// Wait for the next frame delivered by the relay.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.outbound.recv().await
    }

    /// Take a frame the relay already delivered, without waiting.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.outbound.try_recv().ok()
    }

    /// Stop accepting frames from the relay; its sends fail from now on.
    pub fn stop_receiving(&mut self) {
        self.outbound.close();
    }

    /// Whether the relay side has closed the connection.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
