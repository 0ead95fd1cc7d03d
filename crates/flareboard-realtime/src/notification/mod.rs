//! Notification delivery over the live channel.

pub mod dispatcher;

pub use dispatcher::NotificationDispatcher;
