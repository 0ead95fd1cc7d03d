//! CRUD surface used for reconciliation and optimistic mutations.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use flareboard_core::types::id::NotificationId;
use flareboard_entity::notification::{NewNotification, Notification};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Notification endpoints as seen by the client.
#[async_trait]
pub trait NotificationApi: Send + Sync + 'static {
    /// The caller's notifications, newest first.
    async fn list(&self, token: &str, unread_only: bool) -> Result<Vec<Notification>, ClientError>;

    /// The caller's unread count.
    async fn unread_count(&self, token: &str) -> Result<i64, ClientError>;

    /// Mark one notification read.
    async fn mark_read(&self, token: &str, id: NotificationId) -> Result<Notification, ClientError>;

    /// Mark everything read.
    async fn mark_all_read(&self, token: &str) -> Result<u64, ClientError>;

    /// Delete one notification.
    async fn delete(&self, token: &str, id: NotificationId) -> Result<(), ClientError>;

    /// Delete every read notification.
    async fn clear_read(&self, token: &str) -> Result<u64, ClientError>;

    /// Create a notification for any user.
    async fn create(&self, token: &str, input: &NewNotification) -> Result<Notification, ClientError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Count {
    count: i64,
}

#[derive(Debug, Deserialize)]
struct Affected {
    affected: u64,
}

/// `reqwest` implementation of [`NotificationApi`].
#[derive(Debug, Clone)]
pub struct HttpNotificationApi {
    http: reqwest::Client,
    base: String,
}

impl HttpNotificationApi {
    /// Build a client for the configured server.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base: format!("{}/api/notifications", config.api_base()),
        })
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base, path))
            .bearer_auth(token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    let envelope: Envelope<T> = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => {
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: "UNKNOWN".to_string(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }
    };

    if !status.is_success() {
        let (code, message) = envelope
            .error
            .map(|e| (e.code, e.message))
            .unwrap_or_else(|| ("UNKNOWN".to_string(), status.to_string()));
        return Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        });
    }

    envelope
        .data
        .ok_or_else(|| ClientError::Decode("Response envelope has no data".to_string()))
}

#[async_trait]
impl NotificationApi for HttpNotificationApi {
    async fn list(&self, token: &str, unread_only: bool) -> Result<Vec<Notification>, ClientError> {
        let path = format!("?unread_only={unread_only}");
        self.send(self.request(Method::GET, &path, token)).await
    }

    async fn unread_count(&self, token: &str) -> Result<i64, ClientError> {
        let count: Count = self
            .send(self.request(Method::GET, "/unread-count", token))
            .await?;
        Ok(count.count)
    }

    async fn mark_read(&self, token: &str, id: NotificationId) -> Result<Notification, ClientError> {
        let path = format!("/{id}/read");
        self.send(self.request(Method::PATCH, &path, token)).await
    }

    async fn mark_all_read(&self, token: &str) -> Result<u64, ClientError> {
        let affected: Affected = self
            .send(self.request(Method::POST, "/mark-all-read", token))
            .await?;
        Ok(affected.affected)
    }

    async fn delete(&self, token: &str, id: NotificationId) -> Result<(), ClientError> {
        let path = format!("/{id}");
        let _: serde_json::Value = self.send(self.request(Method::DELETE, &path, token)).await?;
        Ok(())
    }

    async fn clear_read(&self, token: &str) -> Result<u64, ClientError> {
        let affected: Affected = self
            .send(self.request(Method::DELETE, "/clear-read", token))
            .await?;
        Ok(affected.affected)
    }

    async fn create(&self, token: &str, input: &NewNotification) -> Result<Notification, ClientError> {
        self.send(self.request(Method::POST, "", token).json(input))
            .await
    }
}
