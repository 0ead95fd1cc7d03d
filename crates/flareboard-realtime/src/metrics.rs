//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    connections_evicted: AtomicU64,
    handshakes_rejected: AtomicU64,
    messages_received: AtomicU64,
    messages_sent: AtomicU64,
    invalid_messages: AtomicU64,
    broadcasts: AtomicU64,
    notifications_persisted: AtomicU64,
    notifications_pushed: AtomicU64,
    delivery_failures: AtomicU64,
}

impl EngineMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session completed its handshake.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A registered session went away.
    pub fn connection_closed(&self) {
        // Saturating: a double close must not wrap the gauge.
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// A session was closed to make room under the per-user cap.
    pub fn connection_evicted(&self) {
        self.connections_evicted.fetch_add(1, Ordering::Relaxed);
    }

    /// A socket failed authentication.
    pub fn handshake_rejected(&self) {
        self.handshakes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// An inbound frame arrived on an open connection.
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// `n` frames were queued for delivery.
    pub fn messages_sent(&self, n: usize) {
        self.messages_sent.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// An inbound frame was rejected.
    pub fn invalid_message(&self) {
        self.invalid_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// A broadcast went out.
    pub fn broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification row was written.
    pub fn notification_persisted(&self) {
        self.notifications_persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification reached at least one live session.
    pub fn notification_pushed(&self) {
        self.notifications_pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// A queued send failed.
    pub fn delivery_failed(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_evicted: self.connections_evicted.load(Ordering::Relaxed),
            handshakes_rejected: self.handshakes_rejected.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            invalid_messages: self.invalid_messages.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            notifications_persisted: self.notifications_persisted.load(Ordering::Relaxed),
            notifications_pushed: self.notifications_pushed.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sessions ever opened.
    pub connections_total: u64,
    /// Sessions currently open.
    pub connections_active: u64,
    /// Sessions closed by the per-user cap.
    pub connections_evicted: u64,
    /// Failed handshakes.
    pub handshakes_rejected: u64,
    /// Inbound frames on open connections.
    pub messages_received: u64,
    /// Outbound frames queued.
    pub messages_sent: u64,
    /// Rejected inbound frames.
    pub invalid_messages: u64,
    /// Broadcasts sent.
    pub broadcasts: u64,
    /// Notifications written.
    pub notifications_persisted: u64,
    /// Notifications pushed live.
    pub notifications_pushed: u64,
    /// Failed sends.
    pub delivery_failures: u64,
}
