//! The identity a client connects as.

use std::fmt;

use staffhub_core::types::UserId;

/// Authenticated identity: who the client is and the access token that
/// proves it.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// User the token was issued to.
    pub user_id: UserId,
    /// Bearer access token.
    pub token: String,
}

impl Identity {
    /// Creates an identity.
    pub fn new(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
