//! Realtime presence and counters.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, RealtimeStatusResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/realtime/status
pub async fn status(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<RealtimeStatusResponse>> {
    let engine = &state.realtime;
    Json(ApiResponse::ok(RealtimeStatusResponse {
        connected_users: engine.registry.connected_user_count(),
        active_connections: engine.registry.connection_count(),
        metrics: engine.metrics_snapshot(),
    }))
}
