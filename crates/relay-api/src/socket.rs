//! Adapter from an upgraded Axum [`WebSocket`] to the relay [`Connection`]
//! contract.

use std::fmt;

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tracing::debug;

use relay_realtime::connection::{Connection, ConnectionError};
use relay_realtime::message::types::{Frame, MessageKind};

/// A WebSocket split into halves, each behind its own lock, so the client's
/// read and its outbound writer never wait on each other.
pub struct WsConnection {
    sink: Mutex<SplitSink<WebSocket, WsMessage>>,
    stream: Mutex<SplitStream<WebSocket>>,
}

impl fmt::Debug for WsConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsConnection").finish()
    }
}

impl WsConnection {
    /// Wraps an upgraded socket.
    pub fn new(socket: WebSocket) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

#[async_trait]
impl Connection for WsConnection {
    /// Returns the next text or binary frame. Ping and pong frames are
    /// answered by the transport and skipped here.
    async fn receive(&self) -> Result<Frame, ConnectionError> {
        let mut stream = self.stream.lock().await;

        loop {
            match stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(Frame::text(text.as_str())),
                Some(Ok(WsMessage::Binary(data))) => return Ok(Frame::binary(data)),
                Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => continue,
                Some(Ok(WsMessage::Close(reason))) => {
                    debug!(reason = ?reason, "Close frame received");
                    return Err(ConnectionError::Closed);
                }
                Some(Err(e)) => return Err(ConnectionError::transport(e)),
                None => return Err(ConnectionError::Closed),
            }
        }
    }

    async fn send(&self, frame: Frame) -> Result<(), ConnectionError> {
        let message = match frame.kind {
            MessageKind::Text => {
                let text = std::str::from_utf8(&frame.payload)?;
                WsMessage::Text(text.to_owned().into())
            }
            MessageKind::Binary => WsMessage::Binary(frame.payload),
        };

        self.sink
            .lock()
            .await
            .send(message)
            .await
            .map_err(ConnectionError::transport)
    }

    async fn close(&self) {
        if let Err(e) = self.sink.lock().await.close().await {
            debug!(error = %e, "WebSocket already closed");
        }
    }
}
