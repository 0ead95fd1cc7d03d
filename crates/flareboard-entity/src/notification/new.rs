//! Input for creating a notification.

use serde::{Deserialize, Serialize};
use validator::Validate;

use flareboard_core::error::AppError;
use flareboard_core::types::id::UserId;

/// Fields supplied when creating a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewNotification {
    /// Recipient.
    pub user_id: UserId,
    /// Category tag.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 64))]
    pub kind: String,
    /// Optional title.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub title: Option<String>,
    /// Optional body.
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub message: Option<String>,
    /// Optional deep link.
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub action_url: Option<String>,
}

impl NewNotification {
    /// Start a notification for `user_id` with category `kind`.
    pub fn new(user_id: UserId, kind: impl Into<String>) -> Self {
        Self {
            user_id,
            kind: kind.into(),
            title: None,
            message: None,
            action_url: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the body.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the deep link.
    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Display text stored alongside the record.
    ///
    /// Blank strings count as absent, so an empty message falls back to
    /// the title.
    pub fn content(&self) -> String {
        non_blank(&self.message)
            .or_else(|| non_blank(&self.title))
            .unwrap_or_default()
            .to_string()
    }

    /// Run field validation and require at least a title or a message.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.kind.trim().is_empty() {
            return Err(AppError::validation("Notification type must not be blank"));
        }
        if non_blank(&self.title).is_none() && non_blank(&self.message).is_none() {
            return Err(AppError::validation(
                "Notification requires a title or a message",
            ));
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
