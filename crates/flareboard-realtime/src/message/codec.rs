//! JSON serialization for realtime frames.

use flareboard_core::error::AppError;
use flareboard_entity::realtime::{ClientMessage, ServerMessage};

/// Parse an inbound text frame.
///
/// Oversized, blank, malformed and unknown-event frames are all
/// validation errors.
pub fn decode_client(raw: &str, max_bytes: usize) -> Result<ClientMessage, AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Failed to parse message: {e}")))
}

/// Serialize an outbound frame.
pub fn encode_server(msg: &ServerMessage) -> Result<String, AppError> {
    Ok(serde_json::to_string(msg)?)
}
