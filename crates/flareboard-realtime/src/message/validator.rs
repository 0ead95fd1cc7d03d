//! Validation of frames received on an open connection.

use validator::Validate;

use flareboard_core::error::AppError;
use flareboard_entity::realtime::ClientMessage;

/// Check that a decoded frame is acceptable on an authenticated connection.
pub fn validate_inbound(msg: &ClientMessage) -> Result<(), AppError> {
    match msg {
        ClientMessage::Auth { .. } => Err(AppError::validation("Connection is already authenticated")),
        ClientMessage::TaskUpdate(task) => Ok(task.validate()?),
        ClientMessage::ProjectUpdate(project) => Ok(project.validate()?),
    }
}

/// Error code sent back to the client for a rejected frame.
pub fn error_code(err: &AppError) -> &'static str {
    match err.kind {
        flareboard_core::error::ErrorKind::Validation => "INVALID_MESSAGE",
        _ => "INTERNAL_ERROR",
    }
}
