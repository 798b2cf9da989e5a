//! Stream consumer connection states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the consumer is in its connect/reconnect cycle.
///
/// `Disconnected -> Connecting -> Connected -> Reconnecting -> Connecting`;
/// any state returns to `Disconnected` on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and none being attempted.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The stream is open and frames are being read.
    Connected,
    /// Waiting out the reconnect delay.
    Reconnecting,
}

impl ConnectionState {
    /// Whether frames can currently arrive.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}
