//! Notification handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use flareboard_core::error::AppError;
use flareboard_core::types::id::NotificationId;
use flareboard_entity::notification::Notification;

use crate::dto::request::{CreateNotificationRequest, ListQuery};
use crate::dto::response::{AffectedResponse, ApiResponse, CountResponse, DeletedResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, parse_id};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, ApiError> {
    let rows = state
        .notification_service
        .list(&auth, query.unread_only)
        .await?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// POST /api/notifications
///
/// Persists only. Live delivery goes through the dispatcher.
pub async fn create_notification(
    State(state): State<AppState>,
    _auth: AuthUser,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    let Json(req) = body.map_err(|e| AppError::validation(e.body_text()))?;
    let created = state.notification_service.create(req.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let id: NotificationId = parse_id(&id)?;
    let updated = state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(updated)))
}

/// POST /api/notifications/mark-all-read
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(AffectedResponse { affected })))
}

/// DELETE /api/notifications/clear-read
pub async fn clear_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<AffectedResponse>>, ApiError> {
    let affected = state.notification_service.clear_read(&auth).await?;
    Ok(Json(ApiResponse::ok(AffectedResponse { affected })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let id: NotificationId = parse_id(&id)?;
    state.notification_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { id })))
}
