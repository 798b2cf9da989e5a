//! Role guards for handlers.

use staffhub_core::error::AppError;

use crate::extractors::AuthUser;

/// Checks that the authenticated user has at least the Manager role.
pub fn require_manager(auth: &AuthUser) -> Result<(), AppError> {
    if auth.role.is_manager_or_above() {
        Ok(())
    } else {
        Err(AppError::authorization("Manager or Admin access required"))
    }
}

/// Checks that the authenticated user is an Admin.
pub fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if auth.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::authorization("Admin access required"))
    }
}
