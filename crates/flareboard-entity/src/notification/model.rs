//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use flareboard_core::types::id::{NotificationId, UserId};

/// A notification delivered to one user.
///
/// `content` is derived once at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Short category tag such as `task_assigned`. Display only.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    /// Notification title.
    pub title: Option<String>,
    /// Notification body text.
    pub message: Option<String>,
    /// Unified display text: message, else title, else empty.
    pub content: String,
    /// Whether the owner has read this notification.
    pub is_read: bool,
    /// Optional deep link into the board.
    pub action_url: Option<String>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Whether `user_id` owns this notification.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
