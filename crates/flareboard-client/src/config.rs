//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the server lives and how patiently to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// HTTP base URL, e.g. `http://localhost:8080`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// WebSocket URL. Derived from `base_url` when absent.
    #[serde(default)]
    pub ws_url: Option<String>,
    /// Pause between reconnect attempts, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Timeout for CRUD requests and the socket handshake, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Capacity of the local event bus.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: None,
            reconnect_delay_ms: default_reconnect_delay(),
            request_timeout_seconds: default_request_timeout(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl ClientConfig {
    /// Config pointing at `base_url` with defaults elsewhere.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// HTTP base without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// The realtime endpoint.
    pub fn ws_endpoint(&self) -> String {
        if let Some(url) = &self.ws_url {
            return url.clone();
        }
        let base = self.api_base();
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        format!("{ws_base}/ws")
    }

    /// Pause between reconnect attempts.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Request and handshake timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_reconnect_delay() -> u64 {
    1_000
}

fn default_request_timeout() -> u64 {
    10
}

fn default_event_buffer() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_endpoint_derivation() {
        assert_eq!(
            ClientConfig::new("http://127.0.0.1:9000/").ws_endpoint(),
            "ws://127.0.0.1:9000/ws"
        );
        assert_eq!(
            ClientConfig::new("https://board.example.com").ws_endpoint(),
            "wss://board.example.com/ws"
        );

        let explicit = ClientConfig {
            ws_url: Some("ws://elsewhere/live".into()),
            ..ClientConfig::default()
        };
        assert_eq!(explicit.ws_endpoint(), "ws://elsewhere/live");
    }
}
