//! # flareboard-service
//!
//! Business logic behind the notification CRUD surface. Services receive a
//! [`context::RequestContext`] describing the caller and enforce ownership
//! before touching the store.

pub mod context;
pub mod notification;

pub use context::RequestContext;
pub use notification::NotificationService;
