//! Client realtime session: connect cycle, reconciliation and optimistic
//! mutations.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use flareboard_core::types::id::{NotificationId, UserId};
use flareboard_entity::board::{ProjectUpdate, TaskUpdate};
use flareboard_entity::notification::Notification;
use flareboard_entity::realtime::{ClientMessage, ServerMessage};

use crate::api::{HttpNotificationApi, NotificationApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::event::{ConnectionState, LocalEvent};
use crate::store::NotificationList;
use crate::transport::{RealtimeTransport, TransportConnection, WsTransport};

/// Signed-in identity the session connects as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token.
    pub token: String,
    /// User the token belongs to.
    pub user_id: UserId,
}

impl Credentials {
    /// Token plus user.
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

struct Driver {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    outbound: mpsc::Sender<ClientMessage>,
}

struct Inner {
    config: ClientConfig,
    api: Arc<dyn NotificationApi>,
    transport: Arc<dyn RealtimeTransport>,
    list: NotificationList,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<LocalEvent>,
    credentials: Mutex<Option<Credentials>>,
}

enum PumpExit {
    Cancelled,
    Lost,
    Stopped(ClientError),
}

/// One live connection per signed-in tab.
///
/// Owns the local notification list and unread counter. Entity updates
/// are not stored; they are re-published on the local event bus.
pub struct RealtimeSession {
    inner: Arc<Inner>,
    driver: tokio::sync::Mutex<Option<Driver>>,
    // Parent of every driver's token, so drop can cancel without the lock.
    root: CancellationToken,
}

impl std::fmt::Debug for RealtimeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSession")
            .field("state", &self.state())
            .field("unread", &self.unread_count())
            .finish()
    }
}

impl RealtimeSession {
    /// Session over the given collaborators. Starts `Disconnected`.
    pub fn new(
        config: ClientConfig,
        api: Arc<dyn NotificationApi>,
        transport: Arc<dyn RealtimeTransport>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            inner: Arc::new(Inner {
                config,
                api,
                transport,
                list: NotificationList::new(),
                state,
                events,
                credentials: Mutex::new(None),
            }),
            driver: tokio::sync::Mutex::new(None),
            root: CancellationToken::new(),
        }
    }

    /// Session talking HTTP and WebSocket to `config.base_url`.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let api = Arc::new(HttpNotificationApi::new(&config)?);
        let transport = Arc::new(WsTransport::new(config.ws_endpoint()));
        Ok(Self::new(config, api, transport))
    }

    /// Replace the identity. Any existing connection is torn down first;
    /// `None` (or a blank token) leaves the session `Disconnected`.
    pub async fn set_credentials(&self, credentials: Option<Credentials>) {
        let mut driver = self.driver.lock().await;
        if let Some(old) = driver.take() {
            old.cancel.cancel();
            let _ = old.task.await;
        }

        let credentials = credentials.filter(|c| !c.token.trim().is_empty());
        *self.inner.credentials_guard() = credentials.clone();

        let Some(credentials) = credentials else {
            self.inner.set_state(ConnectionState::Disconnected);
            return;
        };

        let cancel = self.root.child_token();
        let (outbound, outbound_rx) = mpsc::channel(self.inner.config.event_buffer.max(1));
        let task = tokio::spawn(drive(
            self.inner.clone(),
            credentials,
            cancel.clone(),
            outbound_rx,
        ));
        *driver = Some(Driver {
            cancel,
            task,
            outbound,
        });
    }

    /// Tear down the connection and forget the identity.
    pub async fn shutdown(&self) {
        self.set_credentials(None).await;
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Watch state transitions.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Subscribe to the local event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<LocalEvent> {
        self.inner.events.subscribe()
    }

    /// Local notifications, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.list.snapshot()
    }

    /// Local unread counter.
    pub fn unread_count(&self) -> usize {
        self.inner.list.unread_count()
    }

    /// Fetch the authoritative list now.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let token = self.inner.token()?;
        self.inner.reconcile(&token).await
    }

    /// Optimistically mark one notification read.
    pub async fn mark_as_read(&self, id: NotificationId) -> Result<(), ClientError> {
        let token = self.inner.token()?;
        self.inner.list.mark_read(id);
        let result = self.inner.api.mark_read(&token, id).await.map(|_| ());
        self.inner.report("mark_as_read", result)
    }

    /// Optimistically mark everything read.
    pub async fn mark_all_as_read(&self) -> Result<(), ClientError> {
        let token = self.inner.token()?;
        self.inner.list.mark_all_read();
        let result = self.inner.api.mark_all_read(&token).await.map(|_| ());
        self.inner.report("mark_all_as_read", result)
    }

    /// Optimistically delete one notification.
    pub async fn delete(&self, id: NotificationId) -> Result<(), ClientError> {
        let token = self.inner.token()?;
        self.inner.list.remove(id);
        let result = self.inner.api.delete(&token, id).await;
        self.inner.report("delete", result)
    }

    /// Optimistically drop every read notification.
    pub async fn clear_read(&self) -> Result<(), ClientError> {
        let token = self.inner.token()?;
        self.inner.list.clear_read();
        let result = self.inner.api.clear_read(&token).await.map(|_| ());
        self.inner.report("clear_read", result)
    }

    /// Announce a local task mutation to every open board.
    pub async fn publish_task_update(&self, task: TaskUpdate) -> Result<(), ClientError> {
        self.publish(ClientMessage::TaskUpdate(task)).await
    }

    /// Announce a local project mutation to every open board.
    pub async fn publish_project_update(&self, project: ProjectUpdate) -> Result<(), ClientError> {
        self.publish(ClientMessage::ProjectUpdate(project)).await
    }

    async fn publish(&self, msg: ClientMessage) -> Result<(), ClientError> {
        if self.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        let driver = self.driver.lock().await;
        let Some(driver) = driver.as_ref() else {
            return Err(ClientError::NotConnected);
        };
        driver
            .outbound
            .send(msg)
            .await
            .map_err(|_| ClientError::NotConnected)
    }
}

impl Drop for RealtimeSession {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

impl Inner {
    fn credentials_guard(&self) -> MutexGuard<'_, Option<Credentials>> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn token(&self) -> Result<String, ClientError> {
        self.credentials_guard()
            .as_ref()
            .map(|c| c.token.clone())
            .ok_or(ClientError::NotConnected)
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }

    fn emit(&self, event: LocalEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn report(&self, operation: &str, result: Result<(), ClientError>) -> Result<(), ClientError> {
        if let Err(e) = &result {
            warn!(operation, "Sync failed, local state kept until next fetch: {}", e);
            self.emit(LocalEvent::SyncFailed {
                operation: operation.to_string(),
                message: e.to_string(),
            });
        }
        result
    }

    async fn reconcile(&self, token: &str) -> Result<(), ClientError> {
        match self.api.list(token, false).await {
            Ok(rows) => {
                debug!(count = rows.len(), "Reconciled notification list");
                self.list.replace(rows);
                Ok(())
            }
            Err(e) => {
                warn!("Reconciliation failed: {}", e);
                self.emit(LocalEvent::SyncFailed {
                    operation: "reconcile".to_string(),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Open the socket and complete the auth handshake.
    async fn open(&self, credentials: &Credentials) -> Result<Box<dyn TransportConnection>, ClientError> {
        let mut conn = self.transport.connect().await?;
        conn.send(&ClientMessage::Auth {
            token: credentials.token.clone(),
        })
        .await?;

        let handshake = async {
            loop {
                match conn.recv().await {
                    Some(Ok(ServerMessage::Connected {
                        connection_id,
                        user_id,
                    })) => return Ok((connection_id, user_id)),
                    Some(Ok(other)) => {
                        debug!(event = other.event_name(), "Frame before handshake ignored");
                    }
                    Some(Err(e)) => return Err(e),
                    None => {
                        return Err(ClientError::Transport(
                            "Connection closed during handshake".to_string(),
                        ));
                    }
                }
            }
        };

        let (connection_id, user_id) = timeout(self.config.request_timeout(), handshake)
            .await
            .map_err(|_| ClientError::Transport("Handshake timed out".to_string()))??;

        if user_id != credentials.user_id {
            warn!(expected = %credentials.user_id, got = %user_id, "Token belongs to a different user");
            conn.close().await;
            return Err(ClientError::Rejected(format!(
                "server identified the session as user {user_id}"
            )));
        }

        info!(conn_id = %connection_id, user_id = %credentials.user_id, "Realtime session connected");
        Ok(conn)
    }

    fn apply(&self, msg: ServerMessage) {
        match msg {
            ServerMessage::NotificationNew(notification) => {
                if self.list.prepend(notification.clone()) {
                    self.emit(LocalEvent::NotificationReceived(notification));
                }
            }
            ServerMessage::TaskUpdated(task) => self.emit(LocalEvent::TaskUpdated(task)),
            ServerMessage::ProjectUpdated(project) => {
                self.emit(LocalEvent::ProjectUpdated(project))
            }
            ServerMessage::Error { code, message } => {
                warn!(code = %code, "Server rejected a frame: {}", message);
            }
            ServerMessage::Connected { .. } => {}
        }
    }

    async fn pump(
        &self,
        conn: &mut Box<dyn TransportConnection>,
        outbound: &mut mpsc::Receiver<ClientMessage>,
        cancel: &CancellationToken,
    ) -> PumpExit {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return PumpExit::Cancelled,
                Some(msg) = outbound.recv() => {
                    if let Err(e) = conn.send(&msg).await {
                        warn!("Failed to publish {}: {}", msg.event_name(), e);
                        return PumpExit::Lost;
                    }
                }
                frame = conn.recv() => match frame {
                    Some(Ok(msg)) => self.apply(msg),
                    Some(Err(e)) if e.is_terminal() => return PumpExit::Stopped(e),
                    Some(Err(e)) => {
                        warn!("Realtime connection lost: {}", e);
                        return PumpExit::Lost;
                    }
                    None => return PumpExit::Lost,
                },
            }
        }
    }
}

async fn drive(
    inner: Arc<Inner>,
    credentials: Credentials,
    cancel: CancellationToken,
    mut outbound: mpsc::Receiver<ClientMessage>,
) {
    loop {
        inner.set_state(ConnectionState::Connecting);

        let attempt = tokio::select! {
            _ = cancel.cancelled() => break,
            attempt = inner.open(&credentials) => attempt,
        };

        match attempt {
            Ok(mut conn) => {
                inner.set_state(ConnectionState::Connected);

                let reconciled = tokio::select! {
                    _ = cancel.cancelled() => None,
                    result = inner.reconcile(&credentials.token) => Some(result),
                };
                let exit = match reconciled {
                    None => PumpExit::Cancelled,
                    Some(_) => inner.pump(&mut conn, &mut outbound, &cancel).await,
                };

                conn.close().await;
                inner.set_state(ConnectionState::Disconnected);
                match exit {
                    PumpExit::Cancelled => break,
                    PumpExit::Stopped(e) => {
                        warn!(user_id = %credentials.user_id, "Realtime session ended, not reconnecting: {}", e);
                        return;
                    }
                    PumpExit::Lost => {}
                }
            }
            Err(e) if e.is_terminal() => {
                warn!(user_id = %credentials.user_id, "Realtime credential rejected: {}", e);
                inner.set_state(ConnectionState::Disconnected);
                return;
            }
            Err(e) => {
                debug!("Realtime connect failed: {}", e);
                inner.set_state(ConnectionState::Disconnected);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(inner.config.reconnect_delay()) => {}
        }
    }

    inner.set_state(ConnectionState::Disconnected);
    debug!(user_id = %credentials.user_id, "Realtime driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use flareboard_core::types::id::{ConnectionId, ProjectId, TaskId};
    use flareboard_entity::notification::NewNotification;
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

    #[derive(Default)]
    struct FakeApi {
        rows: Mutex<Vec<Notification>>,
        fail: AtomicBool,
        list_calls: AtomicUsize,
    }

    impl FakeApi {
        fn with_rows(rows: Vec<Notification>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows),
                ..Self::default()
            })
        }

        fn check(&self) -> Result<(), ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 500,
                    code: "INTERNAL_ERROR".into(),
                    message: "Internal server error".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationApi for FakeApi {
        async fn list(&self, _token: &str, _unread_only: bool) -> Result<Vec<Notification>, ClientError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn unread_count(&self, _token: &str) -> Result<i64, ClientError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().iter().filter(|n| !n.is_read).count() as i64)
        }

        async fn mark_read(&self, _token: &str, id: NotificationId) -> Result<Notification, ClientError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|n| n.id == id).ok_or(ClientError::Api {
                status: 404,
                code: "NOT_FOUND".into(),
                message: "Notification not found".into(),
            })?;
            row.is_read = true;
            Ok(row.clone())
        }

        async fn mark_all_read(&self, _token: &str) -> Result<u64, ClientError> {
            self.check()?;
            Ok(0)
        }

        async fn delete(&self, _token: &str, _id: NotificationId) -> Result<(), ClientError> {
            self.check()
        }

        async fn clear_read(&self, _token: &str) -> Result<u64, ClientError> {
            self.check()?;
            Ok(0)
        }

        async fn create(&self, _token: &str, _input: &NewNotification) -> Result<Notification, ClientError> {
            Err(ClientError::NotConnected)
        }
    }

    /// Server end of one fake socket.
    struct ServerSide {
        inbound: UnboundedReceiver<ClientMessage>,
        outbound: UnboundedSender<Result<ServerMessage, ClientError>>,
    }

    struct FakeTransport {
        accepted: UnboundedSender<ServerSide>,
        connects: AtomicUsize,
    }

    struct FakeConnection {
        to_server: UnboundedSender<ClientMessage>,
        from_server: UnboundedReceiver<Result<ServerMessage, ClientError>>,
    }

    #[async_trait]
    impl RealtimeTransport for FakeTransport {
        async fn connect(&self) -> Result<Box<dyn TransportConnection>, ClientError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let (to_server, inbound) = unbounded_channel();
            let (outbound, from_server) = unbounded_channel();
            self.accepted
                .send(ServerSide { inbound, outbound })
                .map_err(|_| ClientError::Transport("listener gone".into()))?;
            Ok(Box::new(FakeConnection {
                to_server,
                from_server,
            }))
        }
    }

    #[async_trait]
    impl TransportConnection for FakeConnection {
        async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
            self.to_server
                .send(msg.clone())
                .map_err(|_| ClientError::Transport("closed".into()))
        }

        async fn recv(&mut self) -> Option<Result<ServerMessage, ClientError>> {
            self.from_server.recv().await
        }

        async fn close(&mut self) {}
    }

    struct Harness {
        session: RealtimeSession,
        api: Arc<FakeApi>,
        transport: Arc<FakeTransport>,
        accepted: UnboundedReceiver<ServerSide>,
    }

    fn harness(rows: Vec<Notification>) -> Harness {
        let api = FakeApi::with_rows(rows);
        let (accepted_tx, accepted) = unbounded_channel();
        let transport = Arc::new(FakeTransport {
            accepted: accepted_tx,
            connects: AtomicUsize::new(0),
        });
        let mut config = ClientConfig::new("http://localhost:8080");
        config.reconnect_delay_ms = 20;
        config.request_timeout_seconds = 1;
        let session = RealtimeSession::new(config, api.clone(), transport.clone());
        Harness {
            session,
            api,
            transport,
            accepted,
        }
    }

    fn note(user_id: UserId, is_read: bool) -> Notification {
        Notification {
            id: NotificationId::new(),
            user_id,
            kind: "task_assigned".into(),
            title: Some("New task".into()),
            message: Some("You were assigned".into()),
            content: "You were assigned".into(),
            is_read,
            action_url: None,
            created_at: Utc::now(),
        }
    }

    async fn accept(accepted: &mut UnboundedReceiver<ServerSide>, user_id: UserId) -> ServerSide {
        let mut side = tokio::time::timeout(Duration::from_secs(2), accepted.recv())
            .await
            .expect("no connect attempt")
            .expect("transport dropped");
        let first = side.inbound.recv().await.expect("no auth frame");
        assert!(matches!(first, ClientMessage::Auth { .. }));
        side.outbound
            .send(Ok(ServerMessage::Connected {
                connection_id: ConnectionId::new(),
                user_id,
            }))
            .unwrap();
        side
    }

    async fn wait_for_state(session: &RealtimeSession, state: ConnectionState) {
        let mut rx = session.state_changes();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == state))
            .await
            .expect("state not reached")
            .unwrap();
    }

    async fn eventually(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition never held");
    }

    #[tokio::test]
    async fn test_without_credentials_never_connects() {
        let h = harness(vec![]);
        h.session.set_credentials(None).await;
        h.session
            .set_credentials(Some(Credentials::new("   ", UserId::new())))
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(h.session.state(), ConnectionState::Disconnected);
        assert_eq!(h.transport.connects.load(Ordering::SeqCst), 0);
        assert!(matches!(
            h.session.mark_all_as_read().await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_reconciles_then_applies_pushes() {
        let user = UserId::new();
        let existing = note(user, false);
        let mut h = harness(vec![existing.clone(), note(user, true)]);
        let mut events = h.session.subscribe();

        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let side = accept(&mut h.accepted, user).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;
        eventually(|| h.session.notifications().len() == 2).await;
        assert_eq!(h.session.unread_count(), 1);

        let pushed = note(user, false);
        side.outbound
            .send(Ok(ServerMessage::NotificationNew(pushed.clone())))
            .unwrap();
        // Already known from the fetch: not counted twice.
        side.outbound
            .send(Ok(ServerMessage::NotificationNew(existing.clone())))
            .unwrap();

        eventually(|| h.session.notifications().len() == 3).await;
        assert_eq!(h.session.notifications()[0].id, pushed.id);
        assert_eq!(h.session.unread_count(), 2);

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, LocalEvent::NotificationReceived(pushed));
    }

    #[tokio::test]
    async fn test_entity_updates_are_redispatched_not_stored() {
        let user = UserId::new();
        let mut h = harness(vec![]);
        let mut events = h.session.subscribe();
        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let side = accept(&mut h.accepted, user).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;

        let task = TaskUpdate::new(TaskId::new(), ProjectId::new(), "Write docs");
        side.outbound
            .send(Ok(ServerMessage::TaskUpdated(task.clone())))
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, LocalEvent::TaskUpdated(task));
        assert!(h.session.notifications().is_empty());
        assert_eq!(h.session.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_credential_is_not_retried() {
        let mut h = harness(vec![]);
        h.session
            .set_credentials(Some(Credentials::new("expired", UserId::new())))
            .await;

        let mut side = h.accepted.recv().await.unwrap();
        side.inbound.recv().await.unwrap();
        side.outbound
            .send(Err(ClientError::Rejected("authentication failed".into())))
            .unwrap();

        wait_for_state(&h.session, ConnectionState::Disconnected).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.transport.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_limit_close_is_not_retried() {
        let user = UserId::new();
        let mut h = harness(vec![]);
        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let side = accept(&mut h.accepted, user).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;

        side.outbound
            .send(Err(ClientError::Superseded("session limit".into())))
            .unwrap();

        wait_for_state(&h.session, ConnectionState::Disconnected).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.transport.connects.load(Ordering::SeqCst), 1);
        assert_eq!(h.session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_handshake_for_another_user_is_rejected() {
        let mut h = harness(vec![]);
        h.session
            .set_credentials(Some(Credentials::new("token", UserId::new())))
            .await;

        let _side = accept(&mut h.accepted, UserId::new()).await;

        wait_for_state(&h.session, ConnectionState::Disconnected).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.transport.connects.load(Ordering::SeqCst), 1);
        assert_eq!(h.api.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drop_stops_driver_even_while_locked() {
        let user = UserId::new();
        let mut h = harness(vec![]);
        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let mut side = accept(&mut h.accepted, user).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;

        // Leave the driver slot locked, as an in-flight publish would.
        std::mem::forget(h.session.driver.lock().await);
        drop(h.session);

        let closed = tokio::time::timeout(Duration::from_secs(2), side.inbound.recv()).await;
        assert!(matches!(closed, Ok(None)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(h.transport.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lost_connection_reconnects_and_reconciles() {
        let user = UserId::new();
        let mut h = harness(vec![]);
        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let side = accept(&mut h.accepted, user).await;
        eventually(|| h.api.list_calls.load(Ordering::SeqCst) == 1).await;

        drop(side);
        let _side = accept(&mut h.accepted, user).await;
        eventually(|| h.api.list_calls.load(Ordering::SeqCst) == 2).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;
    }

    #[tokio::test]
    async fn test_optimistic_update_survives_failed_sync() {
        let user = UserId::new();
        let target = note(user, false);
        let mut h = harness(vec![target.clone()]);
        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let _side = accept(&mut h.accepted, user).await;
        eventually(|| h.session.unread_count() == 1).await;

        let mut events = h.session.subscribe();
        h.api.fail.store(true, Ordering::SeqCst);
        let result = h.session.mark_as_read(target.id).await;

        assert!(result.is_err());
        assert_eq!(h.session.unread_count(), 0);
        assert!(h.session.notifications()[0].is_read);
        let event = events.recv().await.unwrap();
        assert!(matches!(event, LocalEvent::SyncFailed { ref operation, .. } if operation == "mark_as_read"));
    }

    #[tokio::test]
    async fn test_changing_credentials_replaces_the_connection() {
        let alice = UserId::new();
        let bob = UserId::new();
        let mut h = harness(vec![]);

        h.session
            .set_credentials(Some(Credentials::new("alice", alice)))
            .await;
        let mut first = accept(&mut h.accepted, alice).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;

        h.session
            .set_credentials(Some(Credentials::new("bob", bob)))
            .await;
        let mut second = h.accepted.recv().await.unwrap();
        let auth = second.inbound.recv().await.unwrap();
        assert_eq!(auth, ClientMessage::Auth { token: "bob".into() });

        // The old connection was dropped by its driver.
        assert!(first.inbound.recv().await.is_none());

        h.session.shutdown().await;
        assert_eq!(h.session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_publish_requires_connection() {
        let user = UserId::new();
        let mut h = harness(vec![]);
        let project = ProjectUpdate::new(ProjectId::new(), user, "Roadmap");
        assert!(matches!(
            h.session.publish_project_update(project.clone()).await,
            Err(ClientError::NotConnected)
        ));

        h.session
            .set_credentials(Some(Credentials::new("token", user)))
            .await;
        let mut side = accept(&mut h.accepted, user).await;
        wait_for_state(&h.session, ConnectionState::Connected).await;

        h.session
            .publish_project_update(project.clone())
            .await
            .unwrap();
        let frame = side.inbound.recv().await.unwrap();
        assert_eq!(frame, ClientMessage::ProjectUpdate(project));
    }
}
