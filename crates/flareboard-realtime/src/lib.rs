//! # flareboard-realtime
//!
//! Live push channel for FlareBoard:
//!
//! - [`connection::ConnectionRegistry`]: which users are online and through
//!   which sessions.
//! - [`gateway::RealtimeGateway`]: authenticates sockets, registers them
//!   and routes inbound task/project events.
//! - [`notification::NotificationDispatcher`]: persist-then-push
//!   notifications plus best-effort fan-out.
//! - [`server::RealtimeEngine`]: owns all of the above for one process.
//!
//! Delivery on the live channel is best-effort and at-most-once. A
//! notification that misses its push is recovered by the client's
//! reconciliation fetch.

pub mod bridge;
pub mod connection;
pub mod gateway;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use connection::{ConnectionHandle, ConnectionRegistry};
pub use gateway::RealtimeGateway;
pub use notification::NotificationDispatcher;
pub use server::RealtimeEngine;
