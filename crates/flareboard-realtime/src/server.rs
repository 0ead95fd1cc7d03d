//! Top-level realtime engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use flareboard_auth::TokenVerifier;
use flareboard_core::config::RealtimeConfig;
use flareboard_database::store::NotificationStore;

use crate::bridge::EventBridge;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::registry::ConnectionRegistry;
use crate::gateway::RealtimeGateway;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::notification::dispatcher::NotificationDispatcher;

/// Owns the registry and everything that reads or writes it.
///
/// Constructed once at server start and passed by handle; there is no
/// process-global registry.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Online users and their sessions.
    pub registry: Arc<ConnectionRegistry>,
    /// Socket lifecycle and inbound routing.
    pub gateway: Arc<RealtimeGateway>,
    /// Push and notify operations.
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Domain mutation hooks.
    pub event_bridge: Arc<EventBridge>,
    /// Counters.
    pub metrics: Arc<EngineMetrics>,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        verifier: Arc<dyn TokenVerifier>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(EngineMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            registry.clone(),
            store,
            metrics.clone(),
        ));
        let gateway = Arc::new(RealtimeGateway::new(
            config,
            registry.clone(),
            dispatcher.clone(),
            WsAuthenticator::new(verifier),
            metrics.clone(),
        ));
        let event_bridge = Arc::new(EventBridge::new(dispatcher.clone()));

        info!("Real-time engine initialized");

        Self {
            registry,
            gateway,
            dispatcher,
            event_bridge,
            metrics,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Current counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Signal every socket task to stop and close all sessions.
    pub fn shutdown(&self) {
        info!(
            connections = self.registry.connection_count(),
            "Shutting down real-time engine"
        );
        let _ = self.shutdown_tx.send(());
        for handle in self.registry.all_handles() {
            self.gateway.disconnect(&handle);
        }
        info!("Real-time engine shut down");
    }
}
