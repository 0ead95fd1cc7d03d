//! Notification entity and its creation input.

pub mod model;
pub mod new;

pub use model::Notification;
pub use new::NewNotification;
