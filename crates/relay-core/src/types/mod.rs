//! Shared relay types.

pub mod id;

pub use id::ClientId;
