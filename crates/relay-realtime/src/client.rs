//! Client actor: one connected peer and its receive loop.
//!
//! Lifecycle is `Created → Registered → Reading → Closed`. [`Client`] is the
//! created state; [`Client::register`] consumes it and yields an
//! [`ActiveClient`], whose [`ActiveClient::receive_loop`] consumes that in
//! turn. A closed client cannot be reused or registered again.

use std::sync::Arc;

use tracing::{debug, info, warn};

use relay_core::result::AppResult;
use relay_core::types::ClientId;

use crate::connection::{Connection, ConnectionError};
use crate::message::types::Message;
use crate::metrics;
use crate::pool::PoolHandle;

/// A freshly accepted peer, not yet known to the pool.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    connection: Arc<dyn Connection>,
    pool: PoolHandle,
}

impl Client {
    /// Wrap an established connection with a new identity.
    pub fn new(connection: Arc<dyn Connection>, pool: PoolHandle) -> Self {
        Self {
            id: ClientId::new(),
            connection,
            pool,
        }
    }

    /// This client's identity.
    pub fn id(&self) -> ClientId {
        self.id
    }

    pub(crate) fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    /// Register this client and wait until the pool has added it.
    ///
    /// If the pool no longer accepts events the connection is closed and the
    /// error returned.
    pub async fn register(self) -> AppResult<ActiveClient> {
        if let Err(e) = self.pool.register(&self).await {
            self.connection.close().await;
            return Err(e);
        }

        Ok(ActiveClient {
            id: self.id,
            connection: self.connection,
            pool: self.pool,
        })
    }
}

/// A registered client, ready to run its receive loop.
#[derive(Debug)]
pub struct ActiveClient {
    id: ClientId,
    connection: Arc<dyn Connection>,
    pool: PoolHandle,
}

impl ActiveClient {
    /// This client's identity.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Read frames until the connection fails, forwarding each one to the
    /// pool for broadcast.
    ///
    /// On every exit the client submits its deregistration and then closes
    /// its connection, exactly once. If the task running the loop is
    /// cancelled mid-read, the same cleanup is spawned onto the runtime.
    pub async fn receive_loop(self) {
        let guard = CleanupGuard {
            id: self.id,
            connection: Some(self.connection.clone()),
            pool: self.pool.clone(),
        };

        self.read_frames().await;
        guard.release().await;
    }

    async fn read_frames(&self) {
        loop {
            let frame = match self.connection.receive().await {
                Ok(frame) => frame,
                Err(ConnectionError::Closed) => {
                    debug!(client_id = %self.id, "Connection closed by peer");
                    return;
                }
                Err(e) => {
                    info!(client_id = %self.id, error = %e, "Read failed, stopping client");
                    return;
                }
            };

            metrics::messages::record_received(self.pool.metrics());
            debug!(
                client_id = %self.id,
                kind = %frame.kind,
                bytes = frame.len(),
                "Message received"
            );

            if let Err(e) = self.pool.broadcast(Message::new(frame, self.id)).await {
                warn!(client_id = %self.id, error = %e, "Could not submit broadcast");
                return;
            }
        }
    }
}

/// Deregisters the client and closes its connection once.
#[derive(Debug)]
struct CleanupGuard {
    id: ClientId,
    connection: Option<Arc<dyn Connection>>,
    pool: PoolHandle,
}

impl CleanupGuard {
    async fn release(mut self) {
        if let Some(connection) = self.connection.take() {
            cleanup(self.id, connection, self.pool.clone()).await;
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        warn!(client_id = %self.id, "Receive loop cancelled, cleaning up in background");
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(cleanup(self.id, connection, self.pool.clone()));
            }
            Err(_) => {
                warn!(client_id = %self.id, "No runtime left, client was not deregistered");
            }
        }
    }
}

async fn cleanup(id: ClientId, connection: Arc<dyn Connection>, pool: PoolHandle) {
    if let Err(e) = pool.deregister(id).await {
        debug!(client_id = %id, error = %e, "Deregistration not submitted");
    }
    connection.close().await;
    debug!(client_id = %id, "Client closed");
}
