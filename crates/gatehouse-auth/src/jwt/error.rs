//! Token verification failures.

use thiserror::Error;

use gatehouse_core::error::AppError;

/// Why a token was rejected.
///
/// `Invalid` and `Revoked` are kept apart for logging only; both reach
/// callers as the same unauthorized error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Bad signature, malformed, expired, or the wrong kind.
    #[error("token is invalid")]
    Invalid,
    /// Structurally valid but present in the revocation list.
    #[error("token has been revoked")]
    Revoked,
    /// The service could not sign a token.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// The one message every rejected token produces.
pub const UNAUTHORIZED: &str = "Unauthorized";

impl From<VerifyError> for AppError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Invalid | VerifyError::Revoked => AppError::unauthorized(UNAUTHORIZED),
            VerifyError::Signing(msg) => AppError::internal(format!("Token signing failed: {msg}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_and_revoked_are_indistinguishable() {
        let a: AppError = VerifyError::Invalid.into();
        let b: AppError = VerifyError::Revoked.into();
        assert_eq!(a, b);
        assert_eq!(a.kind, gatehouse_core::ErrorKind::Unauthorized);
    }
}
