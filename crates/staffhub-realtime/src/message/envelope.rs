//! Turning producer drafts into dispatchable messages.

use chrono::Utc;

use staffhub_core::types::UserId;

use super::types::{MessageId, NotificationDraft, NotificationMessage};

impl NotificationDraft {
    /// Stamp the draft for dispatch: keep or generate the id and set the
    /// timestamp to now.
    pub fn stamp(self) -> NotificationMessage {
        NotificationMessage {
            kind: self.kind,
            id: self.id.unwrap_or_else(MessageId::generate),
            title: self.title,
            body: self.body,
            severity: self.severity,
            timestamp: Utc::now(),
            target_user_id: self.target_user_id.map(|id| id.to_string()),
            payload: self.payload,
        }
    }

    /// Stamp the draft addressed to `user_id`, overriding any target the
    /// producer set.
    pub fn stamp_for(mut self, user_id: UserId) -> NotificationMessage {
        self.target_user_id = Some(user_id);
        self.stamp()
    }

    /// Stamp the draft as a broadcast; the target is cleared.
    pub fn stamp_broadcast(mut self) -> NotificationMessage {
        self.target_user_id = None;
        self.stamp()
    }
}
