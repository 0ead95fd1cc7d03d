//! Durable notification storage contract.

use async_trait::async_trait;

use flareboard_core::result::AppResult;
use flareboard_core::types::id::{NotificationId, UserId};
use flareboard_entity::notification::{NewNotification, Notification};

/// Filter for listing a user's notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    /// Only rows with `is_read = false`.
    pub unread_only: bool,
    /// Maximum rows, newest first.
    pub limit: i64,
}

impl ListFilter {
    /// All rows up to `limit`.
    pub fn all(limit: i64) -> Self {
        Self {
            unread_only: false,
            limit,
        }
    }

    /// Unread rows up to `limit`.
    pub fn unread(limit: i64) -> Self {
        Self {
            unread_only: true,
            limit,
        }
    }
}

/// Durable CRUD over notification records.
///
/// Implementations perform no ownership checks; callers scope by user.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Persist a new notification. `content` is derived from the input.
    async fn create(&self, input: &NewNotification) -> AppResult<Notification>;

    /// Look up one notification.
    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// A user's notifications, newest first.
    async fn list_for_user(&self, user_id: UserId, filter: ListFilter)
    -> AppResult<Vec<Notification>>;

    /// Number of unread notifications owned by `user_id`.
    async fn count_unread(&self, user_id: UserId) -> AppResult<i64>;

    /// Set `is_read`. Returns the updated row, or `None` if absent.
    async fn mark_read(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Mark every unread row of `user_id` as read. Returns rows changed.
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64>;

    /// Delete one row. Returns whether it existed.
    async fn delete(&self, id: NotificationId) -> AppResult<bool>;

    /// Delete only the read rows of `user_id`. Returns rows removed.
    async fn delete_read(&self, user_id: UserId) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
