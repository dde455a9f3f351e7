//! Per-recipient outbound queue and its writer task.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use relay_core::types::ClientId;

use super::{Connection, ConnectionError};
use crate::message::types::Frame;
use crate::metrics::{self, RelayMetrics};

/// Sending side of one recipient's outbound queue.
///
/// A writer task drains the queue into the connection in FIFO order.
/// Enqueueing never waits, so a recipient that stops reading only loses its
/// own frames. The writer exits once the handle is dropped or a write fails.
#[derive(Debug)]
pub struct OutboundHandle {
    sender: mpsc::Sender<Frame>,
}

impl OutboundHandle {
    /// Create the queue and spawn its writer on the current runtime.
    pub fn spawn(
        client_id: ClientId,
        connection: Arc<dyn Connection>,
        capacity: usize,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        tokio::spawn(write_frames(client_id, connection, receiver, metrics));

        Self { sender }
    }

    /// Queue a frame without waiting.
    ///
    /// Fails with [`ConnectionError::Backlogged`] when the queue is full and
    /// with [`ConnectionError::Closed`] once the writer has stopped.
    pub fn try_send(&self, frame: Frame) -> Result<(), ConnectionError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => ConnectionError::Backlogged,
            TrySendError::Closed(_) => ConnectionError::Closed,
        })
    }

    /// Whether the writer is still running.
    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }
}

async fn write_frames(
    client_id: ClientId,
    connection: Arc<dyn Connection>,
    mut receiver: mpsc::Receiver<Frame>,
    metrics: Arc<RelayMetrics>,
) {
    while let Some(frame) = receiver.recv().await {
        if let Err(e) = connection.send(frame).await {
            warn!(client_id = %client_id, error = %e, "Write failed, stopping outbound writer");
            metrics::messages::record_delivery_failed(&metrics, 1);

            receiver.close();
            let mut discarded = 0u64;
            while receiver.try_recv().is_ok() {
                discarded += 1;
            }
            metrics::messages::record_delivery_failed(&metrics, discarded);
            return;
        }

        metrics::messages::record_delivered(&metrics);
    }

    debug!(client_id = %client_id, "Outbound writer finished");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::connection::MemoryConnection;
    use crate::metrics::MetricsSnapshot;

    /// A connection whose writes never complete.
    #[derive(Debug)]
    struct StalledConnection;

    #[async_trait]
    impl Connection for StalledConnection {
        async fn receive(&self) -> Result<Frame, ConnectionError> {
            std::future::pending().await
        }

        async fn send(&self, _frame: Frame) -> Result<(), ConnectionError> {
            std::future::pending().await
        }

        async fn close(&self) {}
    }

    async fn wait_until(metrics: &RelayMetrics, done: impl Fn(&MetricsSnapshot) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&metrics.snapshot()) {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("writer did not reach the expected state");
    }

    #[tokio::test]
    async fn test_frames_written_in_order() {
        let metrics = Arc::new(RelayMetrics::new());
        let (conn, mut peer) = MemoryConnection::pair();
        let outbound = OutboundHandle::spawn(ClientId::new(), Arc::new(conn), 8, metrics.clone());

        outbound.try_send(Frame::text("one")).unwrap();
        outbound.try_send(Frame::text("two")).unwrap();
        wait_until(&metrics, |m| m.deliveries_sent == 2).await;

        assert_eq!(peer.try_recv(), Some(Frame::text("one")));
        assert_eq!(peer.try_recv(), Some(Frame::text("two")));
    }

    #[tokio::test]
    async fn test_full_queue_rejects_without_waiting() {
        let metrics = Arc::new(RelayMetrics::new());
        let outbound =
            OutboundHandle::spawn(ClientId::new(), Arc::new(StalledConnection), 1, metrics);

        // first frame is taken by the writer, second fills the queue
        outbound.try_send(Frame::text("a")).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        outbound.try_send(Frame::text("b")).unwrap();

        assert!(matches!(
            outbound.try_send(Frame::text("c")),
            Err(ConnectionError::Backlogged)
        ));
        assert!(outbound.is_alive());
    }

    #[tokio::test]
    async fn test_write_failure_stops_writer() {
        let metrics = Arc::new(RelayMetrics::new());
        let (conn, mut peer) = MemoryConnection::pair();
        let outbound = OutboundHandle::spawn(ClientId::new(), Arc::new(conn), 8, metrics.clone());

        peer.stop_receiving();
        outbound.try_send(Frame::text("lost")).unwrap();
        wait_until(&metrics, |m| m.delivery_failures == 1).await;

        tokio::time::timeout(Duration::from_secs(5), async {
            while outbound.is_alive() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("writer should stop");
        assert!(matches!(
            outbound.try_send(Frame::text("late")),
            Err(ConnectionError::Closed)
        ));
        assert_eq!(metrics.snapshot().deliveries_sent, 0);
    }
}
