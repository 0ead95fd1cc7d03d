//! Client error type.

use thiserror::Error;

/// Failures seen by the client session and its collaborators.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request could not be completed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The realtime socket failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server refused the handshake credential.
    #[error("Connection rejected: {0}")]
    Rejected(String),

    /// A newer session of the same user displaced this one.
    #[error("Session closed by a newer session: {0}")]
    Superseded(String),

    /// The server answered with an error envelope.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Envelope code.
        code: String,
        /// Envelope message.
        message: String,
    },

    /// No credentials or no open connection.
    #[error("Not connected")]
    NotConnected,

    /// A response or frame could not be decoded.
    #[error("Failed to decode: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether retrying with the same credential is pointless.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Api { status: 401, .. })
    }

    /// Whether the driver should stop instead of reconnecting.
    pub fn is_terminal(&self) -> bool {
        self.is_auth_rejection() || matches!(self, Self::Superseded(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
