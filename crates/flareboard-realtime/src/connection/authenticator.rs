//! WebSocket authentication: validates the token from the query string or
//! the first `auth` frame.

use std::sync::Arc;

use flareboard_auth::{Claims, TokenVerifier};
use flareboard_core::error::AppError;
use flareboard_entity::realtime::ClientMessage;

use crate::message::codec;

/// Authenticates realtime connections using the shared token verifier.
#[derive(Clone)]
pub struct WsAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Verify a bearer token.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        self.verifier.verify(token).await
    }

    /// Extract the token from a handshake frame.
    ///
    /// Anything other than a well-formed `auth` frame is an authentication
    /// failure, since no identity has been established yet.
    pub fn token_from_frame(raw: &str, max_bytes: usize) -> Result<String, AppError> {
        match codec::decode_client(raw, max_bytes) {
            Ok(ClientMessage::Auth { token }) => Ok(token),
            Ok(other) => Err(AppError::authentication(format!(
                "Expected auth frame, got '{}'",
                other.event_name()
            ))),
            Err(e) => Err(AppError::authentication(format!(
                "Malformed handshake frame: {}",
                e.message
            ))),
        }
    }

    /// Read the handshake frame and verify its token.
    pub async fn authenticate_frame(&self, raw: &str, max_bytes: usize) -> Result<Claims, AppError> {
        let token = Self::token_from_frame(raw, max_bytes)?;
        self.authenticate(&token).await
    }
}
