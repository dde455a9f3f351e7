//! # relay-api
//!
//! HTTP layer for Cube Relay built on Axum.
//!
//! Upgrades `/ws` requests to WebSocket connections and hands them to the
//! relay engine, serves `/health`, and runs the listener with graceful
//! shutdown.

pub mod app;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod socket;
pub mod state;

pub use app::run_server;
pub use router::build_router;
pub use state::AppState;
