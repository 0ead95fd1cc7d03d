//! Notification CRUD.

pub mod service;

pub use service::NotificationService;
