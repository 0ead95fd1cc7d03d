//! End-to-end realtime tests against a server on a real socket.

mod helpers;

use std::time::Duration;

use flareboard_client::{
    ClientConfig, ClientError, ConnectionState, Credentials, LocalEvent, RealtimeSession,
    RealtimeTransport, TransportConnection, WsTransport,
};
use flareboard_core::types::id::{ProjectId, TaskId, UserId};
use flareboard_database::NotificationStore;
use flareboard_entity::board::TaskUpdate;
use flareboard_entity::notification::NewNotification;
use flareboard_entity::realtime::{ClientMessage, ServerMessage};
use helpers::{TestApp, eventually};

fn client_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::new(base_url);
    config.reconnect_delay_ms = 50;
    config.request_timeout_seconds = 2;
    config
}

async fn wait_for_state(session: &RealtimeSession, state: ConnectionState) {
    let mut rx = session.state_changes();
    tokio::time::timeout(Duration::from_secs(3), rx.wait_for(|s| *s == state))
        .await
        .expect("state not reached")
        .expect("session dropped");
}

fn assigned(user_id: UserId, title: &str) -> NewNotification {
    NewNotification::new(user_id, "task_assigned")
        .with_title(title)
        .with_message("M")
}

#[tokio::test]
async fn test_live_delivery_then_reconcile_after_reconnect() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let user = UserId::new();
    let dispatcher = app.state.realtime.dispatcher.clone();
    let registry = app.state.realtime.registry.clone();

    let session = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    session
        .set_credentials(Some(Credentials::new(app.token_for(user), user)))
        .await;
    wait_for_state(&session, ConnectionState::Connected).await;
    assert!(registry.is_online(user));
    assert_eq!(session.unread_count(), 0);

    let first = dispatcher.notify_user(assigned(user, "T")).await.unwrap();
    assert!(!first.is_read);
    eventually(|| session.unread_count() == 1).await;
    assert_eq!(session.notifications(), vec![first.clone()]);

    session.shutdown().await;
    eventually(|| !registry.is_online(user)).await;

    let second = dispatcher.notify_user(assigned(user, "T2")).await.unwrap();
    assert_eq!(app.store.len().await, 2);
    // Nobody was online to receive it.
    assert_eq!(session.unread_count(), 1);

    session
        .set_credentials(Some(Credentials::new(app.token_for(user), user)))
        .await;
    wait_for_state(&session, ConnectionState::Connected).await;
    eventually(|| session.unread_count() == 2).await;
    let ids: Vec<_> = session.notifications().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    session.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_push_reaches_every_session_of_the_user_only() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let alice = UserId::new();
    let bob = UserId::new();

    let tab_one = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    let tab_two = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    let bobs = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    for (session, user) in [(&tab_one, alice), (&tab_two, alice), (&bobs, bob)] {
        session
            .set_credentials(Some(Credentials::new(app.token_for(user), user)))
            .await;
        wait_for_state(session, ConnectionState::Connected).await;
    }
    assert_eq!(app.state.realtime.registry.sessions_for(alice).len(), 2);

    app.state
        .realtime
        .dispatcher
        .notify_user(assigned(alice, "For Alice"))
        .await
        .unwrap();

    eventually(|| tab_one.unread_count() == 1 && tab_two.unread_count() == 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(bobs.unread_count(), 0);

    for session in [&tab_one, &tab_two, &bobs] {
        session.shutdown().await;
    }
    server.stop().await;
}

#[tokio::test]
async fn test_session_cap_evicts_once_without_reconnect_loop() {
    let mut config = helpers::test_config();
    config.realtime.max_connections_per_user = 1;
    let app = TestApp::with_config(config);
    let server = app.spawn().await;
    let user = UserId::new();

    let older = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    older
        .set_credentials(Some(Credentials::new(app.token_for(user), user)))
        .await;
    wait_for_state(&older, ConnectionState::Connected).await;

    let newer = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    newer
        .set_credentials(Some(Credentials::new(app.token_for(user), user)))
        .await;
    wait_for_state(&newer, ConnectionState::Connected).await;
    wait_for_state(&older, ConnectionState::Disconnected).await;

    // Several reconnect delays: a displaced session must stay down.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let metrics = app.state.realtime.metrics.snapshot();
    assert_eq!(metrics.connections_evicted, 1);
    assert_eq!(metrics.connections_active, 1);
    assert_eq!(older.state(), ConnectionState::Disconnected);
    assert_eq!(newer.state(), ConnectionState::Connected);
    assert_eq!(app.state.realtime.registry.sessions_for(user).len(), 1);

    newer.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_task_update_is_broadcast_to_other_boards() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let editor = UserId::new();
    let viewer = UserId::new();

    let editing = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    let viewing = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    editing
        .set_credentials(Some(Credentials::new(app.token_for(editor), editor)))
        .await;
    viewing
        .set_credentials(Some(Credentials::new(app.token_for(viewer), viewer)))
        .await;
    wait_for_state(&editing, ConnectionState::Connected).await;
    wait_for_state(&viewing, ConnectionState::Connected).await;

    let mut events = viewing.subscribe();
    let task = TaskUpdate::new(TaskId::new(), ProjectId::new(), "Move to review");
    editing.publish_task_update(task.clone()).await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await.unwrap() {
                LocalEvent::TaskUpdated(t) => return t,
                _ => continue,
            }
        }
    })
    .await
    .expect("task update not received");
    assert_eq!(event, task);
    // Entity events never touch the notification list.
    assert!(viewing.notifications().is_empty());

    editing.shutdown().await;
    viewing.shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_bad_credential_is_closed_with_policy_code() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let ws_url = client_config(&server.base_url).ws_endpoint();

    let mut conn = WsTransport::new(ws_url.clone()).connect().await.unwrap();
    conn.send(&ClientMessage::Auth {
        token: "garbage".into(),
    })
    .await
    .unwrap();
    let reply = conn.recv().await.expect("socket ended without a close frame");
    assert!(matches!(reply, Err(ClientError::Rejected(_))));

    let expired = app.expired_token_for(UserId::new());
    let mut conn = WsTransport::new(format!("{ws_url}?token={expired}"))
        .connect()
        .await
        .unwrap();
    assert!(matches!(conn.recv().await, Some(Err(ClientError::Rejected(_)))));

    assert_eq!(app.state.realtime.registry.connection_count(), 0);
    assert_eq!(app.state.realtime.metrics_snapshot().handshakes_rejected, 2);
    server.stop().await;
}

#[tokio::test]
async fn test_rejected_session_stays_disconnected() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let user = UserId::new();

    let session = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    session
        .set_credentials(Some(Credentials::new(app.expired_token_for(user), user)))
        .await;

    eventually(|| app.state.realtime.metrics_snapshot().handshakes_rejected == 1).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(app.state.realtime.metrics_snapshot().handshakes_rejected, 1);

    server.stop().await;
}

#[tokio::test]
async fn test_query_token_handshake_and_invalid_frames() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let user = UserId::new();
    let ws_url = client_config(&server.base_url).ws_endpoint();

    let mut conn = WsTransport::new(format!("{ws_url}?token={}", app.token_for(user)))
        .connect()
        .await
        .unwrap();
    let connected = conn.recv().await.unwrap().unwrap();
    assert!(matches!(connected, ServerMessage::Connected { user_id, .. } if user_id == user));

    let blank = TaskUpdate::new(TaskId::new(), ProjectId::new(), "");
    conn.send(&ClientMessage::TaskUpdate(blank)).await.unwrap();
    let reply = conn.recv().await.unwrap().unwrap();
    assert!(matches!(reply, ServerMessage::Error { ref code, .. } if code == "INVALID_MESSAGE"));

    // The connection survives a bad frame.
    assert!(app.state.realtime.registry.is_online(user));
    conn.close().await;
    eventually(|| !app.state.realtime.registry.is_online(user)).await;

    server.stop().await;
}

#[tokio::test]
async fn test_optimistic_mutations_reach_the_server() {
    let app = TestApp::new();
    let server = app.spawn().await;
    let user = UserId::new();
    let read_one = app.seed(user, "Done", true).await;
    let unread = app.seed(user, "Open", false).await;

    let session = RealtimeSession::from_config(client_config(&server.base_url)).unwrap();
    session
        .set_credentials(Some(Credentials::new(app.token_for(user), user)))
        .await;
    wait_for_state(&session, ConnectionState::Connected).await;
    eventually(|| session.notifications().len() == 2).await;

    session.clear_read().await.unwrap();
    assert_eq!(session.notifications().len(), 1);
    assert_eq!(app.store.len().await, 1);

    session.mark_as_read(unread.id).await.unwrap();
    assert_eq!(session.unread_count(), 0);
    assert_eq!(app.store.count_unread(user).await.unwrap(), 0);

    assert!(session.delete(read_one.id).await.is_err());

    session.shutdown().await;
    server.stop().await;
}
