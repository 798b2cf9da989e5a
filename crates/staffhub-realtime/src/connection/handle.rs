//! A single user's push connection.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use staffhub_core::types::{ConnectionId, Role, UserId};

/// Outcome of a successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The frame was queued.
    Queued,
    /// The frame was queued after the oldest pending frame was dropped to
    /// make room.
    Displaced,
}

/// Failure to push a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The receiving side is gone; the connection is dead.
    #[error("push channel closed")]
    Closed,
}

/// Outbound side of a connection's event stream.
///
/// `push` never waits on the remote peer, so one slow client cannot stall
/// a fan-out.
pub trait PushChannel: Send + Sync + fmt::Debug {
    /// Queue one serialized notification for delivery.
    fn push(&self, data: Arc<str>) -> Result<Delivery, ChannelError>;

    /// Close the channel; the stream ends once queued frames are drained.
    fn close(&self);

    /// Whether either side has closed the channel.
    fn is_closed(&self) -> bool;
}

/// A registered connection: who is connected, with which role, and where
/// to push.
///
/// The role is the one presented when the connection was opened and is not
/// refreshed for the lifetime of the connection.
#[derive(Clone)]
pub struct Connection {
    /// Unique per opened stream; distinguishes a replaced connection from
    /// its successor for the same user.
    pub id: ConnectionId,
    /// Owning user.
    pub user_id: UserId,
    /// Role captured at connect time.
    pub role: Role,
    /// Username, for logs and diagnostics.
    pub username: String,
    /// When the stream was opened.
    pub connected_at: DateTime<Utc>,
    channel: Arc<dyn PushChannel>,
}

impl Connection {
    /// Create a connection with a fresh id.
    pub fn new(
        user_id: UserId,
        role: Role,
        username: impl Into<String>,
        channel: Arc<dyn PushChannel>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            role,
            username: username.into(),
            connected_at: Utc::now(),
            channel,
        }
    }

    /// Push one serialized notification.
    pub fn push(&self, data: Arc<str>) -> Result<Delivery, ChannelError> {
        self.channel.push(data)
    }

    /// Close the underlying channel.
    pub fn close(&self) {
        self.channel.close();
    }

    /// Whether the underlying channel is closed.
    pub fn is_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Serializable snapshot of this connection.
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            user_id: self.user_id,
            username: self.username.clone(),
            role: self.role.clone(),
            connected_at: self.connected_at,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Snapshot of connection info (serializable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// User ID
    pub user_id: UserId,
    /// Username
    pub username: String,
    /// Role
    pub role: Role,
    /// Connected at
    pub connected_at: DateTime<Utc>,
}
