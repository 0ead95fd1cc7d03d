//! Request DTOs.

use serde::{Deserialize, Serialize};

use flareboard_core::error::AppError;
use flareboard_core::types::id::UserId;
use flareboard_entity::notification::NewNotification;

/// Query for `GET /api/notifications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Only unread rows.
    #[serde(default, alias = "unreadOnly")]
    pub unread_only: bool,
}

/// Body of `POST /api/notifications`.
///
/// Every field is optional at the serde level so a missing field surfaces
/// as a 400 in the response envelope rather than a bare rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    /// Recipient.
    #[serde(default, alias = "userId")]
    pub user_id: Option<UserId>,
    /// Category tag.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Body.
    #[serde(default)]
    pub message: Option<String>,
    /// Deep link.
    #[serde(default, alias = "actionUrl")]
    pub action_url: Option<String>,
}

impl CreateNotificationRequest {
    /// Require user, type, title and message, then build the creation input.
    pub fn into_new(self) -> Result<NewNotification, AppError> {
        let mut missing = Vec::new();
        if self.user_id.is_none() {
            missing.push("user_id");
        }
        if is_blank(&self.kind) {
            missing.push("type");
        }
        if is_blank(&self.title) {
            missing.push("title");
        }
        if is_blank(&self.message) {
            missing.push("message");
        }

        let (Some(user_id), Some(kind), Some(title), Some(message), true) = (
            self.user_id,
            self.kind,
            self.title,
            self.message,
            missing.is_empty(),
        ) else {
            return Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        let mut input = NewNotification::new(user_id, kind)
            .with_title(title)
            .with_message(message);
        input.action_url = self.action_url.filter(|u| !u.trim().is_empty());
        Ok(input)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

/// Query accepted on the WebSocket upgrade.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    /// Handshake token; when absent the first frame must be `auth`.
    pub token: Option<String>,
}
