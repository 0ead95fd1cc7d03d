//! Typed task and project update payloads carried over the live channel.

pub mod project;
pub mod task;

pub use project::{ProjectStatus, ProjectUpdate};
pub use task::{TaskPriority, TaskStatus, TaskUpdate};
