//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flareboard_core::types::id::NotificationId;
use flareboard_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: i64,
}

/// Rows touched by a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectedResponse {
    /// Rows changed or removed.
    pub affected: u64,
}

/// Single delete acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    /// Removed notification.
    pub id: NotificationId,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Notification store status.
    pub database: String,
    /// Live sessions.
    pub ws_connections: usize,
    /// Online users.
    pub online_users: usize,
    /// When the process started.
    pub started_at: DateTime<Utc>,
}

/// Realtime presence and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeStatusResponse {
    /// Distinct online users.
    pub connected_users: usize,
    /// Open sessions.
    pub active_connections: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}
