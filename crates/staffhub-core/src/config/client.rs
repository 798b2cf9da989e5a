//! Stream consumer configuration.

use serde::{Deserialize, Serialize};

/// Configuration of the client-side stream consumer and notification
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the StaffHub server, e.g. `http://localhost:8080`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the event stream endpoint.
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    /// Maximum number of notifications kept in the local history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Buffer size of the internal event bus.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// Reconnect policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            history_capacity: default_history_capacity(),
            event_buffer: default_event_buffer(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Reconnect delay settings.
///
/// The defaults reproduce a constant 3 second delay retried forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Growth factor applied after each failed attempt (1.0 = constant).
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Upper bound for the delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    /// Random jitter as a fraction of the delay (0.0 – 1.0).
    #[serde(default)]
    pub jitter: f64,
    /// Give up after this many consecutive failed attempts; `None` retries
    /// forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay(),
            jitter: 0.0,
            max_attempts: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_stream_path() -> String {
    "/api/notifications/stream".to_string()
}

fn default_history_capacity() -> usize {
    50
}

fn default_event_buffer() -> usize {
    256
}

fn default_base_delay() -> u64 {
    3000
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_max_delay() -> u64 {
    60_000
}
