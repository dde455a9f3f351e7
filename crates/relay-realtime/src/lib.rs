//! # relay-realtime
//!
//! Real-time fan-out engine for Cube Relay. Provides:
//!
//! - The [`Connection`] contract the upgrade layer hands to the engine
//! - Client actors, one receive loop per connected peer
//! - The connection pool: a single coordinator task that owns membership
//!   and broadcasts every inbound message to all other clients
//! - Relay metrics counters

pub mod client;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod pool;
pub mod server;

pub use client::Client;
pub use connection::{Connection, ConnectionError};
pub use message::types::{Frame, Message, MessageKind};
pub use pool::{Pool, PoolHandle};
pub use server::RelayEngine;
