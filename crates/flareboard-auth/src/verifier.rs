//! Token verification contract.

use async_trait::async_trait;

use flareboard_core::result::AppResult;

use crate::jwt::{Claims, JwtDecoder};

/// Validates a bearer credential and yields its claims.
///
/// Failures are `ErrorKind::Authentication` and terminal for the request
/// or connection that presented the token.
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    /// Verify `token` and return its claims.
    async fn verify(&self, token: &str) -> AppResult<Claims>;
}

#[async_trait]
impl TokenVerifier for JwtDecoder {
    async fn verify(&self, token: &str) -> AppResult<Claims> {
        self.decode_access_token(token)
    }
}
