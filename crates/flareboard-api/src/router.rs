//! Route definitions for the FlareBoard HTTP API.
//!
//! REST routes are mounted under `/api`; the realtime upgrade lives at
//! `/ws`.

use axum::Router;
use axum::routing::{delete, get, patch, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes, threading `AppState` through every
/// handler.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(realtime_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Notification CRUD for the authenticated caller
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications)
                .post(handlers::notification::create_notification),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/mark-all-read",
            post(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/clear-read",
            delete(handlers::notification::clear_read),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
}

fn realtime_routes() -> Router<AppState> {
    Router::new().route("/realtime/status", get(handlers::realtime::status))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
