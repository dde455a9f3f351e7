//! Membership metrics helpers.

use std::sync::atomic::Ordering;

use super::RelayMetrics;

/// Record a new member and the resulting membership size
pub fn record_register(metrics: &RelayMetrics, members: usize) {
    metrics.connections_total.fetch_add(1, Ordering::Relaxed);
    metrics
        .connections_active
        .store(members as u64, Ordering::Relaxed);
}

/// Record the membership size after a deregistration
pub fn record_deregister(metrics: &RelayMetrics, members: usize) {
    metrics
        .connections_active
        .store(members as u64, Ordering::Relaxed);
}
