//! Request DTOs.

use serde::{Deserialize, Serialize};

use staffhub_core::types::{Role, UserId};
use staffhub_realtime::NotificationDraft;

/// Who a dispatched notification goes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DispatchTarget {
    /// One user.
    User {
        /// Recipient.
        #[serde(rename = "userId")]
        user_id: UserId,
    },
    /// An explicit list of users.
    Users {
        /// Recipients.
        #[serde(rename = "userIds")]
        user_ids: Vec<UserId>,
    },
    /// Users connected with any of these roles.
    Roles {
        /// Role filter; empty reaches nobody.
        roles: Vec<Role>,
    },
    /// Everybody connected.
    All,
}

/// POST /api/notifications/dispatch body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Recipients.
    pub target: DispatchTarget,
    /// The notification to deliver.
    pub notification: NotificationDraft,
}
