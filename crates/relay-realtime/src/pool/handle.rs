//! Submission side of the connection pool.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use relay_core::config::pool::PoolConfig;
use relay_core::error::AppError;
use relay_core::result::AppResult;
use relay_core::types::ClientId;

use crate::client::Client;
use crate::connection::OutboundHandle;
use crate::message::types::Message;
use crate::metrics::RelayMetrics;

/// A request to add a client to the pool's membership.
#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) id: ClientId,
    pub(crate) outbound: OutboundHandle,
    /// Completed by the coordinator once the client is a member.
    pub(crate) applied: oneshot::Sender<()>,
}

/// Receiving ends of the pool's three inlets.
#[derive(Debug)]
pub(crate) struct Inlets {
    pub(crate) register: mpsc::Receiver<Registration>,
    pub(crate) deregister: mpsc::Receiver<ClientId>,
    pub(crate) broadcast: mpsc::Receiver<Message>,
}

/// Cloneable handle used by clients (and the accept path) to submit events
/// to the pool coordinator.
///
/// [`PoolHandle::register`] returns once the coordinator has applied the
/// registration. Deregistration and broadcast only enqueue; their effect
/// happens later on the coordinator's task, and they wait only while their
/// inlet is full. Once the coordinator has stopped, submissions fail with a
/// service-unavailable error.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    register_tx: mpsc::Sender<Registration>,
    deregister_tx: mpsc::Sender<ClientId>,
    broadcast_tx: mpsc::Sender<Message>,
    outbound_capacity: usize,
    metrics: Arc<RelayMetrics>,
}

/// Create a handle and the inlets it feeds. A capacity of 0 is raised to 1.
pub(crate) fn channel(config: &PoolConfig, metrics: Arc<RelayMetrics>) -> (PoolHandle, Inlets) {
    let capacity = config.inlet_capacity.max(1);
    let (register_tx, register) = mpsc::channel(capacity);
    let (deregister_tx, deregister) = mpsc::channel(capacity);
    let (broadcast_tx, broadcast) = mpsc::channel(capacity);

    let handle = PoolHandle {
        register_tx,
        deregister_tx,
        broadcast_tx,
        outbound_capacity: config.outbound_capacity,
        metrics,
    };
    let inlets = Inlets {
        register,
        deregister,
        broadcast,
    };

    (handle, inlets)
}

impl PoolHandle {
    /// Register `client` and wait until the coordinator has added it.
    ///
    /// Starts the client's outbound writer. Any deregistration submitted
    /// after this returns is applied after the registration.
    pub async fn register(&self, client: &Client) -> AppResult<()> {
        let (applied, ack) = oneshot::channel();
        let registration = Registration {
            id: client.id(),
            outbound: OutboundHandle::spawn(
                client.id(),
                client.connection(),
                self.outbound_capacity,
                self.metrics.clone(),
            ),
            applied,
        };

        self.register_tx
            .send(registration)
            .await
            .map_err(|_| pool_stopped())?;
        ack.await.map_err(|_| pool_stopped())
    }

    /// Submit removal of `client_id`. Removing a client that is not a member
    /// is a no-op on the coordinator.
    pub async fn deregister(&self, client_id: ClientId) -> AppResult<()> {
        self.deregister_tx
            .send(client_id)
            .await
            .map_err(|_| pool_stopped())
    }

    /// Submit a message for fan-out to every member except its sender.
    pub async fn broadcast(&self, message: Message) -> AppResult<()> {
        self.broadcast_tx.send(message).await.map_err(|e| {
            debug!(sender = %e.0.sender(), "Broadcast dropped, pool has stopped");
            pool_stopped()
        })
    }

    /// Whether the coordinator has stopped consuming events.
    pub fn is_closed(&self) -> bool {
        self.broadcast_tx.is_closed()
    }

    /// Shared metrics counters.
    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }
}

fn pool_stopped() -> AppError {
    AppError::service_unavailable("connection pool has stopped")
}
