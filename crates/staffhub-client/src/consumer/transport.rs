//! Event stream transports.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;

use staffhub_core::config::ClientConfig;

use crate::error::TransportError;
use crate::identity::Identity;

/// Raw bytes of an open event stream. Dropping it closes the connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Opens the event stream for an identity.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect and return the stream once the server has accepted it.
    async fn connect(&self, identity: &Identity) -> Result<ByteStream, TransportError>;
}

/// [`Transport`] over an HTTP streaming response.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Stream from `base_url` + `stream_path`.
    pub fn new(base_url: &str, stream_path: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), stream_path),
        }
    }

    /// Build from client configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, &config.stream_path)
    }

    /// Full stream URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(&self, identity: &Identity) -> Result<ByteStream, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(&identity.token)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(TransportError::Unauthorized),
            status => return Err(TransportError::Status(status.as_u16())),
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(TransportError::from)),
        ))
    }
}
