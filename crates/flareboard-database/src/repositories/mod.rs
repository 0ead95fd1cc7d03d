//! PostgreSQL-backed repositories.

pub mod notification;
