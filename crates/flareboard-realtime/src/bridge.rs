//! Domain mutation hooks into the live channel.
//!
//! CRUD handlers call these after a write commits so every open board
//! view can reconcile, and assignees hear about new work.

use std::sync::Arc;

use tracing::debug;

use flareboard_core::result::AppResult;
use flareboard_core::types::id::UserId;
use flareboard_entity::board::{ProjectUpdate, TaskUpdate};
use flareboard_entity::notification::{NewNotification, Notification};
use flareboard_entity::realtime::ServerMessage;

use crate::notification::dispatcher::NotificationDispatcher;

/// Notification type used for assignments.
pub const TASK_ASSIGNED: &str = "task_assigned";

/// Maps domain events onto broadcasts and notifications.
#[derive(Debug)]
pub struct EventBridge {
    dispatcher: Arc<NotificationDispatcher>,
}

impl EventBridge {
    /// Create a new event bridge.
    pub fn new(dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// A task was written. Returns the number of sessions reached.
    pub fn task_updated(&self, task: TaskUpdate) -> usize {
        self.dispatcher.broadcast_all(ServerMessage::TaskUpdated(task))
    }

    /// A project was written. Returns the number of sessions reached.
    pub fn project_updated(&self, project: ProjectUpdate) -> usize {
        self.dispatcher
            .broadcast_all(ServerMessage::ProjectUpdated(project))
    }

    /// A task was assigned to someone other than the actor.
    ///
    /// Self-assignment produces no notification.
    pub async fn task_assigned(
        &self,
        task: &TaskUpdate,
        actor: UserId,
    ) -> AppResult<Option<Notification>> {
        let Some(assignee) = task.assigned_to else {
            return Ok(None);
        };
        if assignee == actor {
            debug!(task_id = %task.id, "Self-assignment, no notification");
            return Ok(None);
        }

        let input = NewNotification::new(assignee, TASK_ASSIGNED)
            .with_title("New task assigned")
            .with_message(format!("You have been assigned to \"{}\"", task.title))
            .with_action_url(format!("/projects/{}/tasks/{}", task.project_id, task.id));
        self.dispatcher.notify_user(input).await.map(Some)
    }
}
