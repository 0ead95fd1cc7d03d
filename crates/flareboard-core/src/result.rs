//! Convenience result alias.

use crate::error::AppError;

/// Result type used across all FlareBoard crates.
pub type AppResult<T> = Result<T, AppError>;
