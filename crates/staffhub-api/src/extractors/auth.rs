//! `AuthUser` extractor: pulls the access token from the request,
//! validates it, and injects the caller's identity.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::Deserialize;

use staffhub_core::error::AppError;
use staffhub_realtime::AuthenticatedUser;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    /// Consume the extractor and return the identity.
    pub fn into_inner(self) -> AuthenticatedUser {
        self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AuthenticatedUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Bearer token from the `Authorization` header, or the `token` query
/// parameter for clients that cannot set headers on a stream request.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        let value = header
            .to_str()
            .map_err(|_| AppError::authentication("Invalid Authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;
        return Ok(token.trim().to_string());
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Missing access token"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let user = state.authenticator.authenticate(&token).await?;
        Ok(AuthUser(user))
    }
}
