//! Builder for notification drafts.

use serde::Serialize;

use staffhub_core::types::UserId;

use super::types::{MessageId, NotificationDraft, NotificationKind, Payload, Severity};

/// Fluent builder for [`NotificationDraft`].
#[derive(Debug, Clone, Default)]
pub struct NotificationBuilder {
    draft: NotificationDraft,
}

impl NotificationBuilder {
    /// Start a draft with a title and body.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            draft: NotificationDraft {
                title: title.into(),
                body: body.into(),
                ..NotificationDraft::default()
            },
        }
    }

    /// Set the message kind.
    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.draft.kind = kind;
        self
    }

    /// Set the severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.draft.severity = severity;
        self
    }

    /// Use a caller-chosen message id.
    pub fn id(mut self, id: impl Into<MessageId>) -> Self {
        self.draft.id = Some(id.into());
        self
    }

    /// Address the draft to a single user.
    pub fn target(mut self, user_id: UserId) -> Self {
        self.draft.target_user_id = Some(user_id);
        self
    }

    /// Insert one payload entry. Values that fail to serialize are stored
    /// as `null`.
    pub fn data(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.draft
            .payload
            .get_or_insert_with(Payload::new)
            .insert(key.into(), value);
        self
    }

    /// Replace the whole payload.
    pub fn payload(mut self, payload: Payload) -> Self {
        self.draft.payload = Some(payload);
        self
    }

    /// Finish building.
    pub fn build(self) -> NotificationDraft {
        self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_payload_entries() {
        let user = UserId::new();
        let draft = NotificationBuilder::new("Task assigned", "Prepare onboarding deck")
            .kind(NotificationKind::TaskUpdate)
            .severity(Severity::Info)
            .target(user)
            .data("taskId", "t-42")
            .data("priority", 2)
            .build();

        assert_eq!(draft.kind, NotificationKind::TaskUpdate);
        assert_eq!(draft.target_user_id, Some(user));
        let payload = draft.payload.expect("payload");
        assert_eq!(payload["taskId"], "t-42");
        assert_eq!(payload["priority"], 2);
    }
}
