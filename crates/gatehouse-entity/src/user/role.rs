//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the RBAC system.
///
/// `SuperAdmin` may manage other administrators; `Admin` may only read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular administrator.
    #[default]
    Admin,
    /// Administrator allowed to manage other administrators.
    SuperAdmin,
}

impl UserRole {
    /// Every role, lowest privilege first.
    pub const ALL: [UserRole; 2] = [UserRole::Admin, UserRole::SuperAdmin];

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = gatehouse_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(gatehouse_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, super_admin"
            ))),
        }
    }
}
