//! Stream authentication: resolves a presented token to a user and role.

use std::sync::Arc;

use async_trait::async_trait;

use staffhub_auth::jwt::JwtDecoder;
use staffhub_core::error::AppError;
use staffhub_core::types::{Role, UserId};

/// Identity established for a stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User ID.
    pub user_id: UserId,
    /// Role at authentication time.
    pub role: Role,
    /// Username.
    pub username: String,
}

/// Resolves a bearer token to an [`AuthenticatedUser`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Validate `token`; failures are authentication errors.
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError>;
}

/// Authenticates streams using signed JWT access tokens.
#[derive(Clone)]
pub struct JwtAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator").finish()
    }
}

impl JwtAuthenticator {
    /// Creates a new JWT authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let claims = self.decoder.decode_access_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.user_id(),
            role: claims.role,
            username: claims.username,
        })
    }
}
