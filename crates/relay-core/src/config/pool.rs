//! Broadcast pool configuration.

use serde::{Deserialize, Serialize};

/// Settings for the connection pool coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Capacity of each of the pool's three inlets (register, deregister,
    /// broadcast).
    ///
    /// Inlets are bounded: when one is full, the submitting client task waits
    /// until the coordinator drains it. This caps memory held by queued events
    /// at the cost of slowing readers down while the coordinator is behind.
    /// Larger values absorb longer bursts and use more memory.
    #[serde(default = "default_inlet_capacity")]
    pub inlet_capacity: usize,

    /// Frames that may wait in one recipient's outbound queue.
    ///
    /// The coordinator never waits on a recipient: when this queue is full the
    /// frame is dropped for that recipient and counted as a failed delivery.
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            inlet_capacity: default_inlet_capacity(),
            outbound_capacity: default_outbound_capacity(),
        }
    }
}

fn default_inlet_capacity() -> usize {
    256
}

fn default_outbound_capacity() -> usize {
    64
}
