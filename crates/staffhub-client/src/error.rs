//! Transport errors.

use thiserror::Error;

/// Failure to open or read the event stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP request could not be sent or its body failed mid-read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server refused the presented token.
    #[error("stream rejected: unauthorized")]
    Unauthorized,
    /// The server answered with an unexpected status.
    #[error("unexpected status {0}")]
    Status(u16),
    /// Any other stream failure.
    #[error("stream error: {0}")]
    Stream(String),
}
