//! Token signing and password policy configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Authentication and credential configuration.
///
/// `jwt_secret` has no default; a deployment without one must not start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HMAC-SHA256 token signing.
    pub jwt_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: i64,
    /// Clock skew tolerated when checking `exp`.
    #[serde(default = "default_leeway")]
    pub leeway_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Apply the strict password profile to super administrators.
    #[serde(default)]
    pub strict_super_admin_passwords: bool,
}

impl AuthConfig {
    /// Configuration with default lifetimes and the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            leeway_seconds: default_leeway(),
            password_min_length: default_password_min(),
            strict_super_admin_passwords: false,
        }
    }

    /// Reject a blank secret or non-positive lifetimes.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration(
                "auth.jwt_secret must be set to a non-empty value",
            ));
        }
        if self.access_ttl_minutes <= 0 {
            return Err(AppError::configuration(
                "auth.access_ttl_minutes must be positive",
            ));
        }
        if self.refresh_ttl_hours <= 0 {
            return Err(AppError::configuration(
                "auth.refresh_ttl_hours must be positive",
            ));
        }
        Ok(())
    }

    /// Access token lifetime.
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.access_ttl_minutes)
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.refresh_ttl_hours)
    }
}

fn default_access_ttl() -> i64 {
    15
}

fn default_refresh_ttl() -> i64 {
    168
}

fn default_leeway() -> u64 {
    0
}

fn default_password_min() -> usize {
    8
}
