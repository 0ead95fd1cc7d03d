//! Project snapshot broadcast after a mutation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use flareboard_core::types::id::{ProjectId, UserId};

/// Project lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// In use.
    Active,
    /// Read-only.
    Archived,
    /// Not started yet.
    Planning,
}

/// State of a project after a client-side mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProjectUpdate {
    /// Project being updated.
    pub id: ProjectId,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Description.
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub description: Option<String>,
    /// Owner.
    pub owner_id: UserId,
    /// Lifecycle state.
    pub status: ProjectStatus,
}

impl ProjectUpdate {
    /// Active project with no description.
    pub fn new(id: ProjectId, owner_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            owner_id,
            status: ProjectStatus::Active,
        }
    }
}
