//! Realtime gateway: authenticates sockets, owns registration and routes
//! inbound board events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use flareboard_auth::Claims;
use flareboard_core::config::RealtimeConfig;
use flareboard_core::error::AppError;
use flareboard_entity::realtime::{ClientMessage, ServerMessage};

use crate::connection::authenticator::WsAuthenticator;
use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::message::{codec, validator};
use crate::metrics::EngineMetrics;
use crate::notification::dispatcher::NotificationDispatcher;

/// Bridges raw connections to the registry and the dispatcher.
///
/// The gateway is the only component that registers or unregisters
/// sessions.
pub struct RealtimeGateway {
    registry: Arc<ConnectionRegistry>,
    dispatcher: Arc<NotificationDispatcher>,
    authenticator: WsAuthenticator,
    metrics: Arc<EngineMetrics>,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeGateway")
            .field("config", &self.config)
            .finish()
    }
}

impl RealtimeGateway {
    /// Creates a new gateway.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<ConnectionRegistry>,
        dispatcher: Arc<NotificationDispatcher>,
        authenticator: WsAuthenticator,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            authenticator,
            metrics,
            config,
        }
    }

    /// Gateway settings.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// The registry this gateway maintains.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Verify a token presented out of band (query string).
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AppError> {
        self.authenticator.authenticate(token).await
    }

    /// Verify the first frame of a socket.
    pub async fn authenticate_frame(&self, raw: &str) -> Result<Claims, AppError> {
        self.authenticator
            .authenticate_frame(raw, self.config.max_message_bytes)
            .await
    }

    /// Record a failed handshake. The socket never reaches `Connected`.
    pub fn reject(&self, err: &AppError) {
        self.metrics.handshake_rejected();
        warn!("WebSocket handshake rejected: {}", err.message);
    }

    /// Open a logical connection for verified `claims`.
    ///
    /// Evicts the user's oldest sessions when the per-user cap is reached.
    /// The `connected` frame is queued before the session becomes
    /// reachable, so it is always the first message on the returned
    /// receiver.
    pub fn connect(&self, claims: Claims) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerMessage>) {
        let user_id = claims.user_id();
        let cap = self.config.max_connections_per_user;

        let (handle, rx) = ConnectionHandle::new(claims, self.config.outbound_buffer_size);
        let handle = Arc::new(handle);

        let connected = ServerMessage::Connected {
            connection_id: handle.id,
            user_id,
        };
        if let Err(e) = handle.send(connected) {
            warn!(conn_id = %handle.id, "Failed to queue connected frame: {}", e);
        }

        let evicted = self.registry.register_capped(handle.clone(), cap);
        self.metrics.connection_opened();
        for oldest in evicted {
            warn!(
                conn_id = %oldest.id,
                user_id = %user_id,
                max = cap,
                "User at max connections, closing oldest session"
            );
            oldest.evict();
            self.metrics.connection_closed();
            self.metrics.connection_evicted();
        }

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            sessions = self.registry.sessions_for(user_id).len(),
            "WebSocket connection registered"
        );
        (handle, rx)
    }

    /// Process one inbound text frame from an open connection.
    ///
    /// Bad frames are answered with an `error` frame and the connection
    /// stays open.
    pub fn handle_frame(&self, handle: &ConnectionHandle, raw: &str) {
        self.metrics.message_received();

        let msg = match codec::decode_client(raw, self.config.max_message_bytes)
            .and_then(|msg| validator::validate_inbound(&msg).map(|()| msg))
        {
            Ok(msg) => msg,
            Err(e) => {
                self.metrics.invalid_message();
                debug!(conn_id = %handle.id, "Rejected inbound frame: {}", e.message);
                let reply = ServerMessage::error(validator::error_code(&e), e.message);
                if let Err(send_err) = handle.send(reply) {
                    warn!(conn_id = %handle.id, "Failed to send error frame: {}", send_err);
                }
                return;
            }
        };

        debug!(conn_id = %handle.id, event = msg.event_name(), "Inbound event");
        match msg {
            ClientMessage::TaskUpdate(task) => {
                self.dispatcher.broadcast_all(ServerMessage::TaskUpdated(task));
            }
            ClientMessage::ProjectUpdate(project) => {
                self.dispatcher
                    .broadcast_all(ServerMessage::ProjectUpdated(project));
            }
            ClientMessage::Auth { .. } => {}
        }
    }

    /// Close and unregister a session. Safe to call more than once.
    pub fn disconnect(&self, handle: &ConnectionHandle) {
        handle.close();
        if self.registry.unregister(handle.user_id, handle.id).is_some() {
            self.metrics.connection_closed();
            info!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                "WebSocket connection unregistered"
            );
        }
    }
}
