//! Realtime gateway and notification configuration.

use serde::{Deserialize, Serialize};

/// Realtime (WebSocket) gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Seconds a freshly upgraded socket has to present its credential.
    /// `0` waits indefinitely.
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_seconds: u64,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Grace period after a missed ping before the socket is dropped.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Maximum live sessions per user; `0` means unbounded.
    #[serde(default)]
    pub max_connections_per_user: usize,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            handshake_timeout_seconds: default_handshake_timeout(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_connections_per_user: 0,
            max_message_bytes: default_max_message_size(),
        }
    }
}

/// Notification CRUD settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Maximum rows returned by the list endpoint.
    #[serde(default = "default_list_limit")]
    pub list_limit: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    10
}

fn default_max_message_size() -> usize {
    65_536
}

fn default_list_limit() -> i64 {
    50
}
