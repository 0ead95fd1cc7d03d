//! In-memory notification store using a Tokio mutex.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use flareboard_core::result::AppResult;
use flareboard_core::types::id::{NotificationId, UserId};
use flareboard_entity::notification::{NewNotification, Notification};

use crate::store::{ListFilter, NotificationStore};

/// Notifications kept in insertion order, which is also creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationStore {
    rows: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows across all users.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, input: &NewNotification) -> AppResult<Notification> {
        let notification = Notification {
            id: NotificationId::new(),
            user_id: input.user_id,
            kind: input.kind.clone(),
            title: input.title.clone(),
            message: input.message.clone(),
            content: input.content(),
            is_read: false,
            action_url: input.action_url.clone(),
            created_at: Utc::now(),
        };
        self.rows.lock().await.push(notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|n| n.id == id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: ListFilter,
    ) -> AppResult<Vec<Notification>> {
        let rows = self.rows.lock().await;
        let limit = usize::try_from(filter.limit.max(0)).unwrap_or(usize::MAX);
        Ok(rows
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .filter(|n| !filter.unread_only || n.is_unread())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_unread(&self, user_id: UserId) -> AppResult<i64> {
        let rows = self.rows.lock().await;
        let count = rows
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .count();
        Ok(count as i64)
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        let mut rows = self.rows.lock().await;
        Ok(rows.iter_mut().find(|n| n.id == id).map(|n| {
            n.is_read = true;
            n.clone()
        }))
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let mut changed = 0;
        for n in rows.iter_mut().filter(|n| n.user_id == user_id && n.is_unread()) {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: NotificationId) -> AppResult<bool> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|n| n.id != id);
        Ok(rows.len() < before)
    }

    async fn delete_read(&self, user_id: UserId) -> AppResult<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|n| !(n.user_id == user_id && n.is_read));
        Ok((before - rows.len()) as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
