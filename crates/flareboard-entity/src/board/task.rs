//! Task snapshot broadcast after a mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use flareboard_core::types::id::{ProjectId, TaskId, UserId};

/// Kanban column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
    /// Waiting on something else.
    Blocked,
}

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
    /// Urgent.
    Urgent,
}

/// State of a task after a client-side mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    /// Task being updated.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Card title.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// Card body.
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub description: Option<String>,
    /// Column.
    pub status: TaskStatus,
    /// Urgency.
    pub priority: TaskPriority,
    /// Assignee, if any.
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    /// Due date, if any.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Ordering inside the column.
    #[validate(range(min = 0))]
    pub position: i32,
}

impl TaskUpdate {
    /// Minimal task in the `todo` column.
    pub fn new(id: TaskId, project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assigned_to: None,
            due_date: None,
            position: 0,
        }
    }
}
