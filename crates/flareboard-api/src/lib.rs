//! # flareboard-api
//!
//! HTTP API layer for FlareBoard built on Axum.
//!
//! Provides the notification CRUD endpoints, the realtime WebSocket
//! upgrade, health and status routes, the bearer-token extractor and the
//! uniform `{success, data | error}` response envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server, serve};
pub use state::AppState;
