//! Request-time authentication and role checks.
//!
//! Per request: extract a token, verify it as an access token, then compare
//! the role claim against the operation's allow-list. No state is shared
//! between requests apart from the token service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gatehouse_core::error::AppError;
use gatehouse_entity::user::UserRole;

use crate::jwt::error::UNAUTHORIZED;
use crate::jwt::{Claims, TokenKind, TokenService};

/// Operations restricted to super administrators.
pub const SUPER_ADMIN_ONLY: &[UserRole] = &[UserRole::SuperAdmin];

/// Operations open to every administrator.
pub const ANY_ADMIN: &[UserRole] = &[UserRole::Admin, UserRole::SuperAdmin];

/// Where a request's access token may travel.
///
/// The `Authorization: Bearer` header wins over the cookie when both are set.
#[derive(Debug, Clone, Default)]
pub struct TokenCarrier {
    pub bearer: Option<String>,
    pub cookie: Option<String>,
}

impl TokenCarrier {
    pub fn new(bearer: Option<String>, cookie: Option<String>) -> Self {
        Self { bearer, cookie }
    }

    /// Carrier holding only a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer: Some(token.into()),
            cookie: None,
        }
    }

    /// The token to verify, if any.
    pub fn token(&self) -> Option<&str> {
        fn non_empty(t: &Option<String>) -> Option<&str> {
            t.as_deref().map(str::trim).filter(|t| !t.is_empty())
        }
        non_empty(&self.bearer).or_else(|| non_empty(&self.cookie))
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl Principal {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}

/// Authenticates tokens and enforces role allow-lists.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenService>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve the caller from whatever token the request carried.
    pub async fn authenticate(&self, carrier: &TokenCarrier) -> Result<Principal, AppError> {
        let Some(token) = carrier.token() else {
            return Err(AppError::unauthorized("Missing token"));
        };
        match self.tokens.verify(token, TokenKind::Access).await {
            Ok(claims) => Ok(Principal::from(claims)),
            Err(e) => {
                debug!(reason = %e, "Access denied: token rejected");
                Err(AppError::unauthorized(UNAUTHORIZED))
            }
        }
    }

    /// Allow the call only if the caller's role is in `allowed`.
    pub fn authorize(&self, principal: &Principal, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&principal.role) {
            Ok(())
        } else {
            debug!(
                user_id = principal.user_id,
                role = %principal.role,
                "Access denied: role not allowed"
            );
            Err(AppError::forbidden("Forbidden"))
        }
    }

    pub fn require_super_admin(&self, principal: &Principal) -> Result<(), AppError> {
        self.authorize(principal, SUPER_ADMIN_ONLY)
    }

    pub fn require_any_admin(&self, principal: &Principal) -> Result<(), AppError> {
        self.authorize(principal, ANY_ADMIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::config::AuthConfig;
    use gatehouse_core::error::ErrorKind;
    use gatehouse_entity::user::UserSummary;

    use crate::revocation::RevocationList;

    fn guard() -> (AccessGuard, Arc<TokenService>) {
        let tokens = Arc::new(
            TokenService::new(
                &AuthConfig::with_secret("guard-secret"),
                RevocationList::disabled(),
            )
            .unwrap(),
        );
        (AccessGuard::new(Arc::clone(&tokens)), tokens)
    }

    fn user(role: UserRole) -> UserSummary {
        UserSummary {
            id: 5,
            username: "eve".to_string(),
            role,
        }
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let carrier =
            TokenCarrier::new(Some("from-header".into()), Some("from-cookie".into()));
        assert_eq!(carrier.token(), Some("from-header"));

        let carrier = TokenCarrier::new(Some("  ".into()), Some("from-cookie".into()));
        assert_eq!(carrier.token(), Some("from-cookie"));

        assert_eq!(TokenCarrier::default().token(), None);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (guard, _) = guard();
        let err = guard.authenticate(&TokenCarrier::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_refresh_token_cannot_authenticate() {
        let (guard, tokens) = guard();
        let pair = tokens.issue_pair(&user(UserRole::Admin)).unwrap();
        let err = guard
            .authenticate(&TokenCarrier::bearer(pair.refresh_token))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_cookie_token_authenticates() {
        let (guard, tokens) = guard();
        let pair = tokens.issue_pair(&user(UserRole::Admin)).unwrap();
        let principal = guard
            .authenticate(&TokenCarrier::new(None, Some(pair.access_token)))
            .await
            .unwrap();
        assert_eq!(principal.user_id, 5);
        assert_eq!(principal.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_role_allow_list() {
        let (guard, tokens) = guard();

        let admin = tokens.issue_pair(&user(UserRole::Admin)).unwrap();
        let admin = guard
            .authenticate(&TokenCarrier::bearer(admin.access_token))
            .await
            .unwrap();
        assert_eq!(
            guard.require_super_admin(&admin).unwrap_err().kind,
            ErrorKind::Forbidden
        );
        assert!(guard.require_any_admin(&admin).is_ok());

        let root = tokens.issue_pair(&user(UserRole::SuperAdmin)).unwrap();
        let root = guard
            .authenticate(&TokenCarrier::bearer(root.access_token))
            .await
            .unwrap();
        assert!(guard.require_super_admin(&root).is_ok());
    }
}
