//! Login, refresh and logout flows plus administrator management.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_database::CredentialStore;
use gatehouse_entity::activity::{ActivityAction, ActivityEvent};
use gatehouse_entity::user::{NewUser, User, UserRole, UserSummary};

use crate::activity::ActivityRecorder;
use crate::guard::Principal;
use crate::jwt::error::UNAUTHORIZED;
use crate::jwt::{TokenPair, TokenService};
use crate::password::{PasswordHasher, PasswordPolicy};

/// The only message a failed login ever returns.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 50;

/// Owns the credential lifecycle for administrators.
///
/// Holds no per-request state; one instance is shared by every request.
#[derive(Clone)]
pub struct SessionAuthority {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    policy: PasswordPolicy,
    hasher: PasswordHasher,
    activity: ActivityRecorder,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("tokens", &self.tokens)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SessionAuthority {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        policy: PasswordPolicy,
        activity: ActivityRecorder,
    ) -> Self {
        Self {
            store,
            tokens,
            policy,
            hasher: PasswordHasher::new(),
            activity,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Exchange a username and password for a token pair.
    ///
    /// An unknown username and a wrong password fail identically, and both
    /// paths run one Argon2 verification.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let username = username.trim();
        let user = self.store.find_by_username(username).await?;
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        let matched = self.hasher.verify(password.to_string(), stored_hash).await?;

        let user = match user {
            Some(user) if matched => user,
            Some(user) => {
                warn!(user_id = user.id, "Login failed: wrong password");
                self.activity
                    .record(ActivityEvent::new(ActivityAction::LoginFailed, Some(user.id)));
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
            None => {
                warn!(username = %username, "Login failed: unknown username");
                self.activity.record(
                    ActivityEvent::new(ActivityAction::LoginFailed, None)
                        .with_details(json!({ "username": username })),
                );
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        let pair = self.tokens.issue_pair(&user.summary())?;
        info!(user_id = user.id, role = %user.role, "Login succeeded");
        self.activity
            .record(ActivityEvent::new(ActivityAction::Login, Some(user.id)));
        Ok(pair)
    }

    /// Rotate a refresh token into a new pair.
    ///
    /// The identity is re-read after the old token is consumed, so a role
    /// change or deletion takes effect here. The consumed token is not
    /// restored if anything after that fails.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.tokens.redeem(refresh_token).await?;

        let user = self
            .store
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| {
                debug!(user_id = claims.sub, "Refresh rejected: account no longer exists");
                AppError::unauthorized(UNAUTHORIZED)
            })?;

        if user.role != claims.role {
            info!(
                user_id = user.id,
                from = %claims.role,
                to = %user.role,
                "Role changed since last issuance"
            );
        }

        let pair = self.tokens.issue_pair(&user.summary())?;
        debug!(user_id = user.id, "Refresh token rotated");
        self.activity
            .record(ActivityEvent::new(ActivityAction::Refresh, Some(user.id)));
        Ok(pair)
    }

    /// Revoke a refresh token. Succeeds for tokens that are already expired,
    /// revoked or malformed.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.tokens.revoke(refresh_token).await?;
        self.activity.record(ActivityEvent::new(ActivityAction::Logout, None));
        Ok(())
    }

    /// Revoke any token for the rest of its lifetime.
    pub async fn revoke_token(&self, token: &str) -> AppResult<()> {
        self.tokens.revoke(token).await?;
        Ok(())
    }

    /// Create an administrator. The role defaults to `admin`.
    ///
    /// The password is checked before it is hashed; a rejected password
    /// leaves the store untouched.
    pub async fn register_admin(
        &self,
        actor: Option<&Principal>,
        username: &str,
        password: &str,
        role: Option<UserRole>,
    ) -> AppResult<UserSummary> {
        let username = validate_username(username)?;
        let role = role.unwrap_or_default();
        self.policy.validate_for(password, role)?;

        let password_hash = self.hasher.hash(password.to_string()).await?;
        let user = self
            .store
            .create(NewUser {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Conflict => {
                    AppError::conflict(format!("Username '{username}' already exists"))
                }
                _ => e,
            })?;

        info!(
            user_id = user.id,
            username = %user.username,
            role = %user.role,
            created_by = ?actor.map(|a| a.user_id),
            "Administrator created"
        );
        self.activity.record(
            ActivityEvent::new(ActivityAction::AdminCreated, actor.map(|a| a.user_id))
                .with_target(user.id)
                .with_details(json!({ "role": user.role.as_str() })),
        );
        Ok(user.summary())
    }

    /// Replace an administrator's password.
    pub async fn update_password(
        &self,
        actor: Option<&Principal>,
        user_id: i64,
        new_password: &str,
    ) -> AppResult<()> {
        let mut user = self.require_user(user_id).await?;
        self.policy.validate_for(new_password, user.role)?;

        user.password_hash = self.hasher.hash(new_password.to_string()).await?;
        user.updated_at = Utc::now();
        self.store.update(&user).await?;

        info!(user_id, "Password updated");
        self.activity.record(
            ActivityEvent::new(ActivityAction::PasswordUpdated, actor.map(|a| a.user_id))
                .with_target(user_id),
        );
        Ok(())
    }

    pub async fn list_admins(&self) -> AppResult<Vec<UserSummary>> {
        let users = self.store.list().await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    /// Delete an administrator.
    ///
    /// Callers cannot delete themselves, and the last super administrator
    /// cannot be deleted.
    pub async fn delete_admin(&self, actor: Option<&Principal>, user_id: i64) -> AppResult<()> {
        if actor.is_some_and(|a| a.user_id == user_id) {
            return Err(AppError::forbidden("You cannot delete your own account"));
        }

        let user = self.require_user(user_id).await?;
        if user.is_super_admin() && self.store.count_by_role(UserRole::SuperAdmin).await? <= 1 {
            return Err(AppError::conflict("Cannot delete the last super administrator"));
        }

        self.store.delete(user_id).await?;
        info!(
            user_id,
            username = %user.username,
            deleted_by = ?actor.map(|a| a.user_id),
            "Administrator deleted"
        );
        self.activity.record(
            ActivityEvent::new(ActivityAction::AdminDeleted, actor.map(|a| a.user_id))
                .with_target(user_id),
        );
        Ok(())
    }

    /// Create the first super administrator. Does nothing once one exists.
    pub async fn seed_super_admin(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<UserSummary>> {
        if self.store.count_by_role(UserRole::SuperAdmin).await? > 0 {
            info!("Super administrator already present; seeding skipped");
            return Ok(None);
        }
        let created = self
            .register_admin(None, username, password, Some(UserRole::SuperAdmin))
            .await?;
        Ok(Some(created))
    }

    async fn require_user(&self, user_id: i64) -> AppResult<User> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Administrator {user_id} not found")))
    }
}

fn validate_username(username: &str) -> AppResult<&str> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(AppError::validation(format!(
            "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_trimmed_and_bounded() {
        assert_eq!(validate_username("  alice ").unwrap(), "alice");
        assert!(validate_username("a").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
        assert!(validate_username(&"x".repeat(50)).is_ok());
    }
}
