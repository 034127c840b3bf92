//! Issuing, verifying, rotating and revoking tokens.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gatehouse_core::config::AuthConfig;
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::UserSummary;

use super::claims::{Claims, TokenKind};
use super::error::VerifyError;
use crate::revocation::{ClaimOutcome, RevocationList, RevocationStatus};

/// Returned to the client on login and refresh. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Issues and validates HS256 tokens against a single process-wide secret.
///
/// Verification is stateless apart from one denylist lookup.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    revocations: RevocationList,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("revocations", &self.revocations)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build the service. Fails when the secret is missing or lifetimes are
    /// not positive.
    pub fn new(config: &AuthConfig, revocations: RevocationList) -> AppResult<Self> {
        config.validate()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
            revocations,
        })
    }

    pub fn access_ttl(&self) -> chrono::Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> chrono::Duration {
        self.refresh_ttl
    }

    pub fn revocations(&self) -> &RevocationList {
        &self.revocations
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, VerifyError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| VerifyError::Signing(e.to_string()))
    }

    /// Mint a fresh access/refresh pair for `user`.
    pub fn issue_pair(&self, user: &UserSummary) -> Result<TokenPair, VerifyError> {
        let access = Claims::new(user, TokenKind::Access, self.access_ttl);
        let refresh = Claims::new(user, TokenKind::Refresh, self.refresh_ttl);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
            user: user.clone(),
        })
    }

    /// Signature, expiry and kind. No denylist lookup.
    fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, VerifyError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(reason = %e, "Token rejected");
                VerifyError::Invalid
            })?
            .claims;

        if claims.kind != expected {
            debug!(
                expected = expected.as_str(),
                actual = claims.kind.as_str(),
                user_id = claims.sub,
                "Token rejected: wrong kind"
            );
            return Err(VerifyError::Invalid);
        }
        Ok(claims)
    }

    /// Full verification: signature, expiry, kind, then the denylist.
    ///
    /// If the denylist cannot be reached the token is accepted.
    pub async fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, VerifyError> {
        let claims = self.decode(token, expected)?;
        match self.revocations.check(token).await {
            RevocationStatus::Revoked => {
                debug!(
                    user_id = claims.sub,
                    kind = expected.as_str(),
                    "Token rejected: revoked"
                );
                Err(VerifyError::Revoked)
            }
            RevocationStatus::Clear | RevocationStatus::Degraded => Ok(claims),
        }
    }

    /// Consume a refresh token: verify it and atomically add it to the
    /// denylist. At most one caller succeeds per token while the denylist is
    /// reachable.
    pub async fn redeem(&self, refresh_token: &str) -> Result<Claims, VerifyError> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        match self
            .revocations
            .claim(refresh_token, claims.remaining_ttl())
            .await
        {
            ClaimOutcome::Claimed | ClaimOutcome::Degraded => Ok(claims),
            ClaimOutcome::AlreadyRevoked => {
                debug!(user_id = claims.sub, "Refresh token replayed");
                Err(VerifyError::Revoked)
            }
        }
    }

    /// Redeem `refresh_token` and issue a new pair for the same subject.
    ///
    /// The new pair carries the role from the old claims; see
    /// `SessionAuthority::refresh` for the variant that re-reads the user.
    pub async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, VerifyError> {
        let claims = self.redeem(refresh_token).await?;
        self.issue_pair(&claims.summary())
    }

    /// Add `token` to the denylist for the rest of its lifetime.
    ///
    /// Tokens that are already invalid or expired need no entry, so this is
    /// a successful no-op for them. Store failures are logged, not returned.
    pub async fn revoke(&self, token: &str) -> Result<(), VerifyError> {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(reason = %e, "Revoke skipped: token already unusable");
                return Ok(());
            }
        };
        self.revocations.revoke(token, claims.remaining_ttl()).await;
        Ok(())
    }
}
