//! Password strength rules applied before any password is hashed.

use thiserror::Error;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_entity::user::UserRole;

/// The floor for the configured minimum length.
pub const MIN_LENGTH_FLOOR: usize = 8;

/// The first rule a candidate password failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("Password must be at least {min} characters long")]
    TooShort { min: usize },
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one digit")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSpecial,
    #[error("Password is too easy to guess")]
    TooPredictable,
}

impl From<PolicyViolation> for AppError {
    fn from(v: PolicyViolation) -> Self {
        AppError::validation(v.to_string())
    }
}

/// Which rule set to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyProfile {
    /// Length, upper, lower and digit.
    #[default]
    Standard,
    /// Standard plus a special character and a zxcvbn score of at least 3.
    Strict,
}

/// Validates password strength. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    strict_super_admins: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_LENGTH_FLOOR,
            strict_super_admins: false,
        }
    }
}

impl PasswordPolicy {
    /// Build from configuration. A configured minimum below 8 is raised to 8.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length.max(MIN_LENGTH_FLOOR),
            strict_super_admins: config.strict_super_admin_passwords,
        }
    }

    /// Opt super administrators into the strict profile.
    pub fn with_strict_super_admins(mut self, enabled: bool) -> Self {
        self.strict_super_admins = enabled;
        self
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// The profile a password for `role` must satisfy.
    ///
    /// Every role gets `Standard` unless strict super administrator
    /// passwords were switched on.
    pub fn profile_for(&self, role: UserRole) -> PolicyProfile {
        match role {
            UserRole::SuperAdmin if self.strict_super_admins => PolicyProfile::Strict,
            _ => PolicyProfile::Standard,
        }
    }

    /// Apply the profile for `role`.
    pub fn validate_for(&self, password: &str, role: UserRole) -> Result<(), PolicyViolation> {
        self.validate_with(password, self.profile_for(role))
    }

    /// Apply the standard profile.
    pub fn validate(&self, password: &str) -> Result<(), PolicyViolation> {
        self.validate_with(password, PolicyProfile::Standard)
    }

    /// Apply `profile`, failing on the first unmet rule.
    ///
    /// Rules are checked in order: length (in characters), uppercase,
    /// lowercase, digit, then for `Strict` special character and guessability.
    pub fn validate_with(
        &self,
        password: &str,
        profile: PolicyProfile,
    ) -> Result<(), PolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PolicyViolation::TooShort {
                min: self.min_length,
            });
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(PolicyViolation::MissingUppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            return Err(PolicyViolation::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PolicyViolation::MissingDigit);
        }

        if profile == PolicyProfile::Strict {
            if !password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
            {
                return Err(PolicyViolation::MissingSpecial);
            }
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if estimate.score() < zxcvbn::Score::Three {
                return Err(PolicyViolation::TooPredictable);
            }
        }

        Ok(())
    }
}
