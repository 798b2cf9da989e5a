//! Employee role value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Role of an employee account, as carried in access tokens.
///
/// The set of roles is open: any non-empty string is accepted and
/// normalized to upper case, so `"admin"` and `"ADMIN"` compare equal.
/// [`Role::ADMIN`], [`Role::MANAGER`] and [`Role::EMPLOYEE`] are the values
/// the rest of StaffHub issues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Full system administrator.
    pub const ADMIN: &'static str = "ADMIN";
    /// Team or department manager.
    pub const MANAGER: &'static str = "MANAGER";
    /// Regular employee.
    pub const EMPLOYEE: &'static str = "EMPLOYEE";

    /// Create a role from any string, normalizing to upper case.
    pub fn new(value: impl AsRef<str>) -> Result<Self, AppError> {
        let normalized = value.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(AppError::validation("Role must not be empty"));
        }
        Ok(Self(normalized))
    }

    /// The administrator role.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    /// The manager role.
    pub fn manager() -> Self {
        Self(Self::MANAGER.to_string())
    }

    /// The employee role.
    pub fn employee() -> Self {
        Self(Self::EMPLOYEE.to_string())
    }

    /// Return the normalized role name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        self.0 == Self::ADMIN
    }

    /// Check if this role is a manager or admin.
    pub fn is_manager_or_above(&self) -> bool {
        self.is_admin() || self.0 == Self::MANAGER
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Role::new(raw).map_err(serde::de::Error::custom)
    }
}
