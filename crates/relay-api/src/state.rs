//! Application state shared across all handlers.

use std::sync::Arc;

use relay_core::config::AppConfig;
use relay_realtime::server::RelayEngine;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Relay engine that accepts upgraded connections
    pub relay: RelayEngine,
}

impl AppState {
    /// Creates the state from a loaded configuration and a started engine.
    pub fn new(config: AppConfig, relay: RelayEngine) -> Self {
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}
