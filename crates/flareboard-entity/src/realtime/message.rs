//! JSON frames exchanged over the realtime channel.
//!
//! Every frame is `{"type": <event name>, "payload": {...}}`.

use serde::{Deserialize, Serialize};

use flareboard_core::types::id::{ConnectionId, UserId};

use crate::board::{ProjectUpdate, TaskUpdate};
use crate::notification::Notification;

/// Frames sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Handshake credential. Must be the first frame on a fresh socket.
    #[serde(rename = "auth")]
    Auth {
        /// Bearer token.
        token: String,
    },
    /// A task was mutated locally.
    #[serde(rename = "task:update")]
    TaskUpdate(TaskUpdate),
    /// A project was mutated locally.
    #[serde(rename = "project:update")]
    ProjectUpdate(ProjectUpdate),
}

impl ClientMessage {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "auth",
            Self::TaskUpdate(_) => "task:update",
            Self::ProjectUpdate(_) => "project:update",
        }
    }
}

/// Frames sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Handshake accepted; the logical connection is open.
    #[serde(rename = "connected")]
    Connected {
        /// Identifier of this session.
        connection_id: ConnectionId,
        /// Authenticated user.
        user_id: UserId,
    },
    /// A notification was persisted for the receiving user.
    #[serde(rename = "notification:new")]
    NotificationNew(Notification),
    /// A task changed somewhere on the board.
    #[serde(rename = "task:updated")]
    TaskUpdated(TaskUpdate),
    /// A project changed somewhere on the board.
    #[serde(rename = "project:updated")]
    ProjectUpdated(ProjectUpdate),
    /// An inbound frame on an open connection was rejected.
    #[serde(rename = "error")]
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable reason.
        message: String,
    },
}

impl ServerMessage {
    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::NotificationNew(_) => "notification:new",
            Self::TaskUpdated(_) => "task:updated",
            Self::ProjectUpdated(_) => "project:updated",
            Self::Error { .. } => "error",
        }
    }

    /// Error frame.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}
