//! Notification dispatcher: persist-then-push and best-effort fan-out.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use flareboard_core::result::AppResult;
use flareboard_core::types::id::UserId;
use flareboard_database::store::NotificationStore;
use flareboard_entity::notification::{NewNotification, Notification};
use flareboard_entity::realtime::ServerMessage;

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::metrics::EngineMetrics;

/// Routes payloads to live sessions and creates notifications.
///
/// Only reads the registry. Pushes are at-most-once: a failed or
/// impossible send is logged and dropped, never retried or queued.
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn NotificationStore>,
    metrics: Arc<EngineMetrics>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher").finish()
    }
}

impl NotificationDispatcher {
    /// Create a new dispatcher.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<dyn NotificationStore>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            registry,
            store,
            metrics,
        }
    }

    /// Send `msg` to every session of `user_id`. Returns how many sessions
    /// accepted it; an offline user is a silent no-op.
    pub fn push_to_user(&self, user_id: UserId, msg: ServerMessage) -> usize {
        let handles = self.registry.handles_for(user_id);
        if handles.is_empty() {
            debug!(user_id = %user_id, event = msg.event_name(), "User offline, push skipped");
            return 0;
        }
        self.deliver(&handles, &msg)
    }

    /// Send `msg` to every registered session regardless of owner.
    pub fn broadcast_all(&self, msg: ServerMessage) -> usize {
        let handles = self.registry.all_handles();
        let delivered = self.deliver(&handles, &msg);
        self.metrics.broadcast();
        debug!(
            event = msg.event_name(),
            sessions = handles.len(),
            delivered,
            "Broadcast sent"
        );
        delivered
    }

    /// Persist a notification, then push the stored row to its owner.
    ///
    /// A persistence error is returned and nothing is pushed. Push
    /// failures are logged and swallowed; the row is still returned.
    pub async fn notify_user(&self, input: NewNotification) -> AppResult<Notification> {
        input.check()?;

        let stored = match self.store.create(&input).await {
            Ok(row) => row,
            Err(e) => {
                error!(user_id = %input.user_id, kind = %input.kind, "Failed to persist notification: {}", e);
                return Err(e);
            }
        };
        self.metrics.notification_persisted();

        let delivered = self.push_to_user(stored.user_id, ServerMessage::NotificationNew(stored.clone()));
        if delivered > 0 {
            self.metrics.notification_pushed();
        }

        info!(
            notification_id = %stored.id,
            user_id = %stored.user_id,
            kind = %stored.kind,
            delivered,
            "Notification dispatched"
        );
        Ok(stored)
    }

    fn deliver(&self, handles: &[Arc<ConnectionHandle>], msg: &ServerMessage) -> usize {
        let mut delivered = 0;
        for handle in handles {
            match handle.send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    self.metrics.delivery_failed();
                    warn!(
                        conn_id = %handle.id,
                        user_id = %handle.user_id,
                        event = msg.event_name(),
                        "Push failed: {}",
                        e
                    );
                }
            }
        }
        self.metrics.messages_sent(delivered);
        delivered
    }
}
