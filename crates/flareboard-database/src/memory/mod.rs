//! In-memory implementations for single-process runs and tests.

pub mod notification;

pub use notification::MemoryNotificationStore;
