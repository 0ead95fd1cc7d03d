//! # flareboard-database
//!
//! The [`NotificationStore`] seam plus its two implementations: a
//! PostgreSQL repository for production and an in-memory store used by
//! tests and local demos.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryNotificationStore;
pub use repositories::notification::PgNotificationStore;
pub use store::{ListFilter, NotificationStore};
