//! Relay metrics.
//!
//! Counters are written by the pool coordinator and client tasks and read
//! by the health endpoint. They hold copies of figures, never membership
//! itself.

pub mod connections;
pub mod messages;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Relay-level metrics counters.
#[derive(Debug)]
pub struct RelayMetrics {
    /// Total clients ever registered
    pub connections_total: AtomicU64,
    /// Clients currently in the pool's membership
    pub connections_active: AtomicU64,
    /// Frames read from clients
    pub messages_received: AtomicU64,
    /// Broadcast events processed by the pool
    pub broadcasts_processed: AtomicU64,
    /// Frames successfully written to recipients
    pub deliveries_sent: AtomicU64,
    /// Frames that could not be queued or written for a recipient
    pub delivery_failures: AtomicU64,
}

impl RelayMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self {
            connections_total: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            broadcasts_processed: AtomicU64::new(0),
            deliveries_sent: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            broadcasts_processed: self.broadcasts_processed.load(Ordering::Relaxed),
            deliveries_sent: self.deliveries_sent.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total clients ever registered
    pub connections_total: u64,
    /// Clients currently registered
    pub connections_active: u64,
    /// Frames read from clients
    pub messages_received: u64,
    /// Broadcast events processed
    pub broadcasts_processed: u64,
    /// Successful deliveries
    pub deliveries_sent: u64,
    /// Dropped or failed deliveries
    pub delivery_failures: u64,
}
