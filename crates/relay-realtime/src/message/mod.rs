//! Frame and message type definitions.

pub mod types;

pub use types::{Frame, Message, MessageKind};
