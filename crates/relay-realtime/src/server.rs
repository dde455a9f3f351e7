//! Top-level relay engine that owns the pool task and accepts connections.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use relay_core::config::pool::PoolConfig;

use crate::client::Client;
use crate::connection::Connection;
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::pool::{Pool, PoolHandle};

/// Central relay engine, constructed once at startup and passed to the
/// upgrade handler.
#[derive(Debug, Clone)]
pub struct RelayEngine {
    /// Submission handle for the pool coordinator.
    pool: PoolHandle,
    /// Metrics collector.
    metrics: Arc<RelayMetrics>,
    /// Pool coordinator task.
    pool_task: Arc<JoinHandle<()>>,
    /// When the engine started.
    started_at: DateTime<Utc>,
}

impl RelayEngine {
    /// Creates the pool and spawns its coordinating loop on the current
    /// tokio runtime.
    pub fn start(config: &PoolConfig) -> Self {
        let metrics = Arc::new(RelayMetrics::new());
        let (pool, handle) = Pool::new(config, metrics.clone());
        let pool_task = tokio::spawn(pool.run());

        info!(
            inlet_capacity = config.inlet_capacity,
            outbound_capacity = config.outbound_capacity,
            "Relay engine initialized"
        );

        Self {
            pool: handle,
            metrics,
            pool_task: Arc::new(pool_task),
            started_at: Utc::now(),
        }
    }

    /// Serves one upgraded connection until it fails.
    ///
    /// Creates a client around the connection, registers it, then runs its
    /// receive loop on the calling task.
    pub async fn accept(&self, connection: Arc<dyn Connection>) {
        let client = Client::new(connection, self.pool.clone());
        let client_id = client.id();

        match client.register().await {
            Ok(active) => {
                info!(client_id = %client_id, "Client connected");
                active.receive_loop().await;
                info!(client_id = %client_id, "Client disconnected");
            }
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Rejected connection");
            }
        }
    }

    /// Submission handle for the pool.
    pub fn pool(&self) -> &PoolHandle {
        &self.pool
    }

    /// Current metrics snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Whether the pool coordinator is still running.
    pub fn is_running(&self) -> bool {
        !self.pool_task.is_finished()
    }

    /// Seconds since the engine started.
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
