//! Application builder: wires router, middleware and state into an Axum
//! app, and runs it.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;

use flareboard_auth::JwtDecoder;
use flareboard_core::config::AppConfig;
use flareboard_core::error::AppError;
use flareboard_database::PgNotificationStore;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the FlareBoard server with the given configuration and database
/// pool until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tracing::info!("Starting FlareBoard server...");

    let addr = config.server.bind_address();
    let verifier = Arc::new(JwtDecoder::new(&config.auth));
    let store = Arc::new(PgNotificationStore::new(db_pool));
    let state = AppState::new(config, verifier, store);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("FlareBoard server listening on {}", addr);

    serve(listener, state, shutdown_signal()).await
}

/// Serve `state` on `listener` until `shutdown` resolves.
///
/// On shutdown every live socket is closed, then in-flight requests get
/// `server.shutdown_grace_seconds` to finish.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let engine = state.realtime.clone();
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let fired = Arc::new(Notify::new());
    let fired_signal = fired.clone();

    let app = build_app(state);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            engine.shutdown();
            fired_signal.notify_one();
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = async {
            fired.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!("Shutdown grace period elapsed, dropping remaining connections");
        }
    }

    tracing::info!("FlareBoard server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
