//! Convenience result type alias for Cube Relay.

use crate::error::AppError;

/// A specialized `Result` type for relay operations.
pub type AppResult<T> = Result<T, AppError>;
