//! Application state shared across all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use flareboard_auth::TokenVerifier;
use flareboard_core::config::AppConfig;
use flareboard_database::store::NotificationStore;
use flareboard_realtime::server::RealtimeEngine;
use flareboard_service::notification::NotificationService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Bearer token verification, shared by HTTP and the gateway
    pub verifier: Arc<dyn TokenVerifier>,
    /// Notification persistence
    pub store: Arc<dyn NotificationStore>,
    /// Notification CRUD
    pub notification_service: Arc<NotificationService>,
    /// Registry, gateway and dispatcher
    pub realtime: RealtimeEngine,
    /// Process start, for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("started_at", &self.started_at)
            .finish()
    }
}

impl AppState {
    /// Wire every service from configuration and the two external seams.
    pub fn new(
        config: AppConfig,
        verifier: Arc<dyn TokenVerifier>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let notification_service = Arc::new(NotificationService::new(
            store.clone(),
            config.notifications.list_limit,
        ));
        let realtime = RealtimeEngine::new(config.realtime.clone(), verifier.clone(), store.clone());

        Self {
            config: Arc::new(config),
            verifier,
            store,
            notification_service,
            realtime,
            started_at: Utc::now(),
        }
    }
}
