//! Realtime wire protocol shared by the gateway and the client session.

pub mod message;

pub use message::{ClientMessage, ServerMessage};

/// WebSocket close code sent to a session displaced by a newer one when the
/// per-user session cap is reached. Clients must not reconnect on it.
pub const SESSION_LIMIT_CLOSE_CODE: u16 = 4001;
