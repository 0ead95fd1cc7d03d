//! Realtime transport seam and its tokio-tungstenite implementation.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use flareboard_entity::realtime::{ClientMessage, SESSION_LIMIT_CLOSE_CODE, ServerMessage};

use crate::error::ClientError;

/// Opens raw connections to the realtime endpoint.
#[async_trait]
pub trait RealtimeTransport: Send + Sync + 'static {
    /// Open a socket. The handshake is driven by the caller.
    async fn connect(&self) -> Result<Box<dyn TransportConnection>, ClientError>;
}

/// One open socket carrying typed frames.
#[async_trait]
pub trait TransportConnection: Send {
    /// Send one frame.
    async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError>;

    /// Next server frame. `None` once the socket is closed normally; a
    /// policy close surfaces as [`ClientError::Rejected`] and a session
    /// limit close as [`ClientError::Superseded`].
    async fn recv(&mut self) -> Option<Result<ServerMessage, ClientError>>;

    /// Close the socket.
    async fn close(&mut self);
}

/// WebSocket transport.
#[derive(Debug, Clone)]
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    /// Transport for `url` (`ws://` or `wss://`).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl RealtimeTransport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn TransportConnection>, ClientError> {
        let (stream, _response) = connect_async(self.url.as_str()).await?;
        debug!(url = %self.url, "WebSocket opened");
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl TransportConnection for WsConnection {
    async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let text = serde_json::to_string(msg)?;
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<ServerMessage, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).map_err(ClientError::from));
                }
                Ok(Message::Close(Some(frame))) if frame.code == CloseCode::Policy => {
                    return Some(Err(ClientError::Rejected(frame.reason.to_string())));
                }
                Ok(Message::Close(Some(frame)))
                    if u16::from(frame.code) == SESSION_LIMIT_CLOSE_CODE =>
                {
                    return Some(Err(ClientError::Superseded(frame.reason.to_string())));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
