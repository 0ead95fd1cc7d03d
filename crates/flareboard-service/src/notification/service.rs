//! Notification CRUD with ownership enforcement.

use std::sync::Arc;

use tracing::{debug, info};

use flareboard_core::error::AppError;
use flareboard_core::result::AppResult;
use flareboard_core::types::id::NotificationId;
use flareboard_database::store::{ListFilter, NotificationStore};
use flareboard_entity::notification::{NewNotification, Notification};

use crate::context::RequestContext;

/// Manages the caller's notifications.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    list_limit: i64,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("list_limit", &self.list_limit)
            .finish()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>, list_limit: i64) -> Self {
        Self { store, list_limit }
    }

    /// Lists the caller's most recent notifications, newest first.
    pub async fn list(&self, ctx: &RequestContext, unread_only: bool) -> AppResult<Vec<Notification>> {
        let filter = ListFilter {
            unread_only,
            limit: self.list_limit,
        };
        self.store.list_for_user(ctx.user_id, filter).await
    }

    /// Counts the caller's unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.store.count_unread(ctx.user_id).await
    }

    /// Marks one of the caller's notifications as read. Repeating the call
    /// is harmless.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        id: NotificationId,
    ) -> AppResult<Notification> {
        self.owned(ctx, id).await?;
        let updated = self
            .store
            .mark_read(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        debug!(notification_id = %id, user_id = %ctx.user_id, "Notification marked read");
        Ok(updated)
    }

    /// Marks every unread notification of the caller as read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let changed = self.store.mark_all_read(ctx.user_id).await?;
        debug!(user_id = %ctx.user_id, changed, "Marked all notifications read");
        Ok(changed)
    }

    /// Persists a notification for any user.
    pub async fn create(&self, input: NewNotification) -> AppResult<Notification> {
        input.check()?;
        let created = self.store.create(&input).await?;
        info!(
            notification_id = %created.id,
            user_id = %created.user_id,
            kind = %created.kind,
            "Notification created"
        );
        Ok(created)
    }

    /// Deletes one of the caller's notifications.
    pub async fn delete(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<()> {
        self.owned(ctx, id).await?;
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        debug!(notification_id = %id, user_id = %ctx.user_id, "Notification deleted");
        Ok(())
    }

    /// Deletes the caller's read notifications and nothing else.
    pub async fn clear_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let removed = self.store.delete_read(ctx.user_id).await?;
        debug!(user_id = %ctx.user_id, removed, "Cleared read notifications");
        Ok(removed)
    }

    async fn owned(&self, ctx: &RequestContext, id: NotificationId) -> AppResult<Notification> {
        let notification = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;

        if !notification.is_owned_by(ctx.user_id) {
            return Err(AppError::authorization(
                "You do not have permission to modify this notification",
            ));
        }
        Ok(notification)
    }
}
