//! Health check handler.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relay_realtime::metrics::MetricsSnapshot;

use crate::state::AppState;

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` while the pool coordinator runs, `"degraded"` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Configured listen address.
    pub listen_addr: String,
    /// Seconds since the relay started.
    pub uptime_seconds: i64,
    /// Time of the check.
    pub timestamp: DateTime<Utc>,
    /// Relay counters.
    pub metrics: MetricsSnapshot,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.relay.is_running() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        listen_addr: state.config.server.bind_addr(),
        uptime_seconds: state.relay.uptime_seconds(),
        timestamp: Utc::now(),
        metrics: state.relay.metrics(),
    })
}
