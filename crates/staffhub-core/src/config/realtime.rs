//! Real-time push engine configuration.

use serde::{Deserialize, Serialize};

/// Server-side push (event stream) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum frames buffered per connection before the oldest is dropped.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Interval between keep-alive comments on idle streams, in seconds.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
            keep_alive_seconds: default_keep_alive(),
        }
    }
}

fn default_outbound_queue_capacity() -> usize {
    256
}

fn default_keep_alive() -> u64 {
    15
}
