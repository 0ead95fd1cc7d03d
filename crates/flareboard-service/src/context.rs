//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flareboard_auth::Claims;
use flareboard_core::types::id::UserId;

/// Context for the current authenticated request.
///
/// Built by the auth extractor and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Role from the token.
    pub role_id: String,
    /// Email from the token.
    pub email: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            role_id: role_id.into(),
            email: email.into(),
            request_time: Utc::now(),
        }
    }

    /// Context for the identity asserted by verified claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self::new(claims.user_id(), claims.role_id.clone(), claims.email.clone())
    }
}
