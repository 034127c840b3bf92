//! Claims carried inside every token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_entity::user::{UserRole, UserSummary};

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: i64,
    /// Username at issuance.
    pub username: String,
    /// Role at issuance. Role changes take effect on the next refresh.
    pub role: UserRole,
    pub kind: TokenKind,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Unique token id, so two tokens minted in the same second differ.
    pub jti: Uuid,
}

impl Claims {
    /// Claims for `user` of `kind`, issued now and living for `ttl`.
    pub fn new(user: &UserSummary, kind: TokenKind, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.sub
    }

    /// The identity summary embedded in these claims.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.sub,
            username: self.username.clone(),
            role: self.role,
        }
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Time left before expiry, never less than one second so a denylist
    /// entry always outlives the check that wrote it.
    pub fn remaining_ttl(&self) -> Duration {
        let remaining = self.exp - Utc::now().timestamp();
        Duration::from_secs(remaining.max(1) as u64)
    }
}
