//! Message metrics helpers.

use std::sync::atomic::Ordering;

use super::RelayMetrics;

/// Record a frame read from a client
pub fn record_received(metrics: &RelayMetrics) {
    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
}

/// Record one processed broadcast and the recipients it could not be queued for
pub fn record_broadcast(metrics: &RelayMetrics, rejected: u64) {
    metrics.broadcasts_processed.fetch_add(1, Ordering::Relaxed);
    metrics.delivery_failures.fetch_add(rejected, Ordering::Relaxed);
}

/// Record a frame written to a recipient
pub fn record_delivered(metrics: &RelayMetrics) {
    metrics.deliveries_sent.fetch_add(1, Ordering::Relaxed);
}

/// Record frames that were queued but never written
pub fn record_delivery_failed(metrics: &RelayMetrics, count: u64) {
    metrics.delivery_failures.fetch_add(count, Ordering::Relaxed);
}
