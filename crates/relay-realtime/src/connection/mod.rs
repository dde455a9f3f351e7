//! Connection contract between the upgrade layer and the relay engine.
//!
//! A [`Connection`] is one established, message-framed channel to a remote
//! peer. The owning client task is its only reader and the client's
//! outbound writer is its only writer, so implementations must allow one
//! `receive` and one `send` to be in flight at the same time.

pub mod memory;
pub mod outbound;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::message::types::Frame;

pub use memory::{MemoryConnection, MemoryPeer};
pub use outbound::OutboundHandle;

/// Errors surfaced by a [`Connection`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer closed the connection, or it was closed locally.
    #[error("connection closed")]
    Closed,
    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The recipient's outbound queue is full.
    #[error("outbound queue is full")]
    Backlogged,
    /// A text frame carried a payload that is not valid UTF-8.
    #[error("text frame is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

impl ConnectionError {
    /// Wrap a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Box::new(err))
    }
}

/// A bidirectional, message-framed channel to one remote peer.
#[async_trait]
pub trait Connection: Send + Sync + fmt::Debug {
    /// Wait for the next data frame from the peer.
    ///
    /// Any error, including a peer-initiated close, is terminal for the
    /// connection.
    async fn receive(&self) -> Result<Frame, ConnectionError>;

    /// Send one data frame to the peer.
    async fn send(&self, frame: Frame) -> Result<(), ConnectionError>;

    /// Close the connection. Calling it more than once is harmless.
    async fn close(&self);
}
