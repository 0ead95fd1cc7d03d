//! Individual realtime connection handle.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use flareboard_auth::Claims;
use flareboard_core::error::AppError;
use flareboard_core::types::id::{ConnectionId, UserId};
use flareboard_entity::realtime::ServerMessage;

/// Why a connection was closed from the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Ordinary close: disconnect or shutdown.
    Normal,
    /// Displaced by a newer session of the same user.
    Evicted,
}

/// A handle to one open connection.
///
/// Holds the queue feeding the socket writer plus the claims verified
/// during the handshake. Messages queued on one handle are written in
/// order.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: UserId,
    /// Claims presented at handshake.
    pub claims: Claims,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<ServerMessage>,
    alive: AtomicBool,
    reason: AtomicU8,
    close: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end of its outbound queue.
    pub fn new(claims: Claims, buffer: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: ConnectionId::new(),
            user_id: claims.user_id(),
            claims,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
            reason: AtomicU8::new(0),
            close: CancellationToken::new(),
        };
        (handle, receiver)
    }

    /// Queue a message for this connection without waiting.
    pub fn send(&self, msg: ServerMessage) -> Result<(), AppError> {
        if !self.is_alive() {
            return Err(AppError::delivery(format!("Connection {} is closed", self.id)));
        }
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(AppError::delivery(format!(
                "Connection {} send buffer full",
                self.id
            ))),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(AppError::delivery(format!(
                    "Connection {} writer has gone away",
                    self.id
                )))
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Ask the socket task to close this connection.
    pub fn close(&self) {
        self.mark_dead();
        self.close.cancel();
    }

    /// Close because a newer session of the same user took this slot.
    pub fn evict(&self) {
        self.reason.store(1, Ordering::SeqCst);
        self.close();
    }

    /// Why the connection was closed. `Normal` while still open.
    pub fn close_reason(&self) -> CloseReason {
        match self.reason.load(Ordering::SeqCst) {
            1 => CloseReason::Evicted,
            _ => CloseReason::Normal,
        }
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.close.cancelled()
    }
}
