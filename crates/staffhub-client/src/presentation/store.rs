//! Read-receipt persistence.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use staffhub_core::error::AppError;
use staffhub_realtime::{MessageId, NotificationMessage};

use crate::identity::Identity;

/// A notification as returned by the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNotification {
    #[serde(flatten)]
    pub message: NotificationMessage,
    #[serde(default)]
    pub read: bool,
}

/// Persistence service holding notification history and read flags.
#[async_trait]
pub trait ReadReceiptStore: Send + Sync {
    /// Most recent notifications for the current user, newest first.
    async fn list(&self, limit: usize) -> Result<Vec<StoredNotification>, AppError>;

    async fn mark_read(&self, id: &MessageId) -> Result<(), AppError>;

    async fn mark_all_read(&self) -> Result<(), AppError>;
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: Vec<StoredNotification>,
}

/// [`ReadReceiptStore`] backed by the StaffHub REST API.
#[derive(Debug, Clone)]
pub struct HttpReadReceiptStore {
    client: reqwest::Client,
    base_url: String,
    identity: watch::Receiver<Option<Identity>>,
}

impl HttpReadReceiptStore {
    /// Calls are made as whichever identity `identity` holds at the time.
    pub fn new(base_url: &str, identity: watch::Receiver<Option<Identity>>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            identity,
        }
    }

    fn token(&self) -> Result<String, AppError> {
        self.identity
            .borrow()
            .as_ref()
            .map(|i| i.token.clone())
            .ok_or_else(|| AppError::authentication("No identity to call the notification service"))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
        let response = request
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Notification service: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(AppError::authentication(
                "Notification service rejected the token",
            )),
            StatusCode::NOT_FOUND => Err(AppError::not_found("Notification not found")),
            status => Err(AppError::external_service(format!(
                "Notification service returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl ReadReceiptStore for HttpReadReceiptStore {
    async fn list(&self, limit: usize) -> Result<Vec<StoredNotification>, AppError> {
        let url = format!("{}/api/notifications", self.base_url);
        let response = self
            .send(self.client.get(url).query(&[("limit", limit)]))
            .await?;
        let envelope: ListEnvelope = response.json().await.map_err(|e| {
            AppError::external_service(format!("Invalid notification list: {e}"))
        })?;
        Ok(envelope.data)
    }

    async fn mark_read(&self, id: &MessageId) -> Result<(), AppError> {
        let url = format!("{}/api/notifications/{}/read", self.base_url, id);
        self.send(self.client.put(url)).await?;
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), AppError> {
        let url = format!("{}/api/notifications/read-all", self.base_url);
        self.send(self.client.put(url)).await?;
        Ok(())
    }
}
