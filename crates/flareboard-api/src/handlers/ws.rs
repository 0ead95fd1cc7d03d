//! WebSocket upgrade handler.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, timeout};
use tracing::{debug, info, warn};

use flareboard_auth::Claims;
use flareboard_core::config::RealtimeConfig;
use flareboard_core::error::AppError;
use flareboard_entity::realtime::{SESSION_LIMIT_CLOSE_CODE, ServerMessage};
use flareboard_realtime::connection::{CloseReason, ConnectionHandle};
use flareboard_realtime::gateway::RealtimeGateway;
use flareboard_realtime::message::codec;

use crate::dto::request::WsQuery;
use crate::state::AppState;

/// GET /ws[?token={jwt}]: WebSocket upgrade.
///
/// The upgrade itself is unauthenticated; the credential is checked on the
/// open socket so a rejection can be reported with a policy close code.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Response {
    let max_bytes = state.config.realtime.max_message_bytes;
    ws.max_message_size(max_bytes)
        .on_upgrade(move |socket| handle_socket(state, socket, query.token))
}

async fn handle_socket(state: AppState, mut socket: WebSocket, query_token: Option<String>) {
    let gateway = state.realtime.gateway.clone();
    let config = gateway.config().clone();

    let claims = match handshake(&gateway, &config, &mut socket, query_token).await {
        Ok(claims) => claims,
        Err(e) => {
            gateway.reject(&e);
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "authentication failed".into(),
                })))
                .await;
            return;
        }
    };

    let (handle, outbound) = gateway.connect(claims);
    let (sink, stream) = socket.split();

    let writer = tokio::spawn(write_loop(handle.clone(), sink, outbound, config.clone()));
    read_loop(&state, &gateway, &handle, stream, &config).await;

    gateway.disconnect(&handle);
    let _ = writer.await;
}

/// Wait for the credential: the query token if given, else the first frame.
async fn handshake(
    gateway: &RealtimeGateway,
    config: &RealtimeConfig,
    socket: &mut WebSocket,
    query_token: Option<String>,
) -> Result<Claims, AppError> {
    if let Some(token) = query_token {
        return gateway.authenticate(&token).await;
    }

    let first_frame = async {
        loop {
            match socket.recv().await {
                Some(Ok(Message::Text(text))) => {
                    return gateway.authenticate_frame(text.as_str()).await;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(_)) => return Err(AppError::authentication("Expected auth frame")),
                Some(Err(e)) => {
                    return Err(AppError::authentication(format!(
                        "Socket error before handshake: {e}"
                    )));
                }
                None => return Err(AppError::authentication("Socket closed before handshake")),
            }
        }
    };

    match config.handshake_timeout_seconds {
        0 => first_frame.await,
        secs => timeout(Duration::from_secs(secs), first_frame)
            .await
            .map_err(|_| AppError::authentication("Handshake timed out"))?,
    }
}

/// Drain the session queue into the socket and send heartbeat pings.
async fn write_loop(
    handle: Arc<ConnectionHandle>,
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::Receiver<ServerMessage>,
    config: RealtimeConfig,
) {
    let every = Duration::from_secs(config.ping_interval_seconds.max(1));
    let mut ticker = interval_at(Instant::now() + every, every);

    loop {
        tokio::select! {
            biased;
            msg = outbound.recv() => {
                let Some(msg) = msg else { break };
                let text = match codec::encode_server(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(conn_id = %handle.id, "Failed to encode frame: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = handle.closed() => {
                let frame = match handle.close_reason() {
                    CloseReason::Evicted => CloseFrame {
                        code: SESSION_LIMIT_CLOSE_CODE,
                        reason: "session limit".into(),
                    },
                    CloseReason::Normal => CloseFrame {
                        code: close_code::NORMAL,
                        reason: "connection closed".into(),
                    },
                };
                let _ = sink.send(Message::Close(Some(frame))).await;
                break;
            }
            _ = ticker.tick() => {
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    handle.mark_dead();
    debug!(conn_id = %handle.id, "Writer task ended");
}

/// Feed inbound frames to the gateway until the peer leaves, goes quiet,
/// or the server shuts down.
async fn read_loop(
    state: &AppState,
    gateway: &RealtimeGateway,
    handle: &ConnectionHandle,
    mut stream: SplitStream<WebSocket>,
    config: &RealtimeConfig,
) {
    let idle = Duration::from_secs(config.ping_interval_seconds.max(1) + config.ping_timeout_seconds);
    let mut shutdown = state.realtime.shutdown_receiver();

    loop {
        tokio::select! {
            frame = timeout(idle, stream.next()) => match frame {
                Err(_) => {
                    warn!(conn_id = %handle.id, user_id = %handle.user_id, "Heartbeat timeout");
                    break;
                }
                Ok(None) | Ok(Some(Ok(Message::Close(_)))) => break,
                Ok(Some(Ok(Message::Text(text)))) => gateway.handle_frame(handle, text.as_str()),
                Ok(Some(Ok(_))) => {}
                Ok(Some(Err(e))) => {
                    debug!(conn_id = %handle.id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = handle.closed() => break,
            _ = shutdown.recv() => break,
        }
    }

    info!(conn_id = %handle.id, user_id = %handle.user_id, "WebSocket connection closed");
}
