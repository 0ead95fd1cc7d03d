//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use flareboard_api::{AppState, build_app};
use flareboard_auth::{JwtDecoder, JwtEncoder};
use flareboard_core::config::AppConfig;
use flareboard_core::error::AppError;
use flareboard_core::types::id::UserId;
use flareboard_database::{MemoryNotificationStore, NotificationStore};
use flareboard_entity::notification::{NewNotification, Notification};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for driving the realtime engine directly
    pub state: AppState,
    /// Backing store
    pub store: Arc<MemoryNotificationStore>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application over an in-memory store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with a tweaked config
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryNotificationStore::new());
        let verifier = Arc::new(JwtDecoder::new(&config.auth));
        let state = AppState::new(config.clone(), verifier, store.clone());
        let router = build_app(state.clone());
        let encoder = JwtEncoder::new(&config.auth);

        Self {
            router,
            state,
            store,
            config,
            encoder,
        }
    }

    /// A valid access token for `user_id`
    pub fn token_for(&self, user_id: UserId) -> String {
        self.encoder
            .issue(user_id, "member", "member@test.com")
            .expect("Failed to issue token")
    }

    /// A token that expired an hour ago
    pub fn expired_token_for(&self, user_id: UserId) -> String {
        self.encoder
            .issue_with_ttl(user_id, "member", "member@test.com", chrono::Duration::hours(-1))
            .expect("Failed to issue token")
    }

    /// Insert a notification directly into the store
    pub async fn seed(&self, user_id: UserId, title: &str, read: bool) -> Notification {
        let input = NewNotification::new(user_id, "task_assigned")
            .with_title(title)
            .with_message(format!("{title} body"));
        let created = self.store.create(&input).await.expect("Failed to seed");
        if read {
            return self
                .store
                .mark_read(created.id)
                .await
                .expect("Failed to mark read")
                .expect("Seeded row vanished");
        }
        created
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the app on an ephemeral local port
    pub async fn spawn(&self) -> RunningServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("No local address");
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(flareboard_api::serve(listener, self.state.clone(), async {
            let _ = rx.await;
        }));

        RunningServer {
            base_url: format!("http://{addr}"),
            shutdown: Some(tx),
            handle,
        }
    }
}

/// Config with a fixed secret and short timers
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.jwt_leeway_seconds = 0;
    config.server.shutdown_grace_seconds = 1;
    config.realtime.handshake_timeout_seconds = 2;
    config
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error.code` member of a failure envelope
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

/// A server bound to a real socket
pub struct RunningServer {
    /// `http://127.0.0.1:{port}`
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), AppError>>,
}

impl RunningServer {
    /// Trigger graceful shutdown and wait for the server to stop
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("Server did not stop")
            .expect("Server task panicked")
            .expect("Server returned an error");
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never held");
}
