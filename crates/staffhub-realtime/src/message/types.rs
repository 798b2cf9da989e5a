//! Notification message type definitions.
//!
//! Field names follow the JSON carried in each `data:` frame of the event
//! stream, which the browser client also consumes.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

use staffhub_core::types::UserId;

/// Opaque key/value payload attached to a notification.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Length of the random suffix in generated message ids.
const ID_SUFFIX_LEN: usize = 9;

/// Unique message identifier, the sole deduplication key on the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh identifier: millisecond timestamp plus a random
    /// lowercase alphanumeric suffix.
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What the notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// General-purpose notification.
    #[default]
    Notification,
    /// Attendance changed (check-in, check-out, correction).
    AttendanceUpdate,
    /// Task created, assigned, or changed status.
    TaskUpdate,
}

/// Presentation severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    #[default]
    Info,
    /// Something completed successfully.
    Success,
    /// Needs attention.
    Warning,
    /// Something failed.
    Error,
}

impl Severity {
    /// Return the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A notification as delivered on the wire.
///
/// `timestamp` is set when the message is dispatched and is informational
/// only; no ordering is derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Message kind.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Unique message id.
    pub id: MessageId,
    /// Short title.
    pub title: String,
    /// Body text.
    #[serde(rename = "message")]
    pub body: String,
    /// Severity.
    #[serde(rename = "notificationType", default)]
    pub severity: Severity,
    /// Dispatch time.
    pub timestamp: DateTime<Utc>,
    /// Recipient for targeted messages; absent on broadcasts. Kept opaque
    /// on the wire since other producers use non-UUID user ids.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    /// Opaque payload.
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// A notification as handed over by a producer, before dispatch.
///
/// The dispatcher assigns the id (if absent) and the timestamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotificationDraft {
    /// Caller-chosen id; generated at dispatch when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    /// Message kind.
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    #[serde(rename = "message")]
    pub body: String,
    /// Severity.
    #[serde(rename = "notificationType", default)]
    pub severity: Severity,
    /// Recipient for targeted messages.
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<UserId>,
    /// Opaque payload.
    #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}
