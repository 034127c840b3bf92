//! Denylist of revoked tokens, keyed by the SHA-256 of the raw token.
//!
//! The store behind it is optional and may be slow or down. Reads are
//! bounded and retried once, then fail open. Writes are bounded, never
//! retried, and their failure is only logged.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use gatehouse_cache::CacheManager;
use gatehouse_cache::keys;
use gatehouse_core::config::CacheConfig;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::CacheProvider;

const MARKER: &str = "1";

/// Outcome of a denylist lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    Revoked,
    Clear,
    /// The store could not answer; callers treat the token as not revoked.
    Degraded,
}

/// Outcome of an atomic set-if-absent on the denylist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller inserted the entry first.
    Claimed,
    /// An entry already existed.
    AlreadyRevoked,
    /// The store could not answer; callers proceed as if claimed.
    Degraded,
}

/// Reachability of the store, as reported by health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreHealth {
    Ok,
    Degraded,
    Disabled,
}

/// SHA-256 hex digest of a raw token. The raw token is never stored.
pub fn fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Short prefix of a fingerprint, safe to put in logs.
fn log_id(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

/// The revocation list over an optional key-value store.
#[derive(Debug, Clone)]
pub struct RevocationList {
    store: Option<Arc<CacheManager>>,
    timeout: Duration,
    backoff: Duration,
}

impl RevocationList {
    /// Use `store` with the timeouts from configuration.
    pub fn new(store: Option<Arc<CacheManager>>, config: &CacheConfig) -> Self {
        Self {
            store,
            timeout: config.operation_timeout(),
            backoff: config.retry_backoff(),
        }
    }

    /// A list with no backing store: every check reports `Degraded`.
    pub fn disabled() -> Self {
        Self {
            store: None,
            timeout: Duration::from_millis(250),
            backoff: Duration::from_millis(25),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    async fn bounded<T, F>(&self, fut: F) -> Option<AppResult<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.timeout, fut).await.ok()
    }

    /// Look `token` up in the denylist.
    pub async fn check(&self, token: &str) -> RevocationStatus {
        let Some(store) = &self.store else {
            debug!("No revocation store configured; token treated as not revoked");
            return RevocationStatus::Degraded;
        };
        let hash = fingerprint(token);
        let key = keys::revoked_token(&hash);

        for attempt in 0..2 {
            if attempt > 0 {
                tokio::time::sleep(self.backoff).await;
            }
            match self.bounded(store.exists(&key)).await {
                Some(Ok(true)) => return RevocationStatus::Revoked,
                Some(Ok(false)) => return RevocationStatus::Clear,
                Some(Err(e)) => {
                    debug!(
                        token = log_id(&hash),
                        attempt,
                        error = %e,
                        "Revocation lookup failed"
                    );
                }
                None => {
                    debug!(token = log_id(&hash), attempt, "Revocation lookup timed out");
                }
            }
        }

        warn!(
            token = log_id(&hash),
            "Revocation store unavailable; treating token as not revoked"
        );
        RevocationStatus::Degraded
    }

    /// Atomically insert `token` unless it is already present.
    pub async fn claim(&self, token: &str, ttl: Duration) -> ClaimOutcome {
        let Some(store) = &self.store else {
            debug!("No revocation store configured; claim proceeds unguarded");
            return ClaimOutcome::Degraded;
        };
        let hash = fingerprint(token);
        let key = keys::revoked_token(&hash);

        match self.bounded(store.set_nx(&key, MARKER, ttl)).await {
            Some(Ok(true)) => ClaimOutcome::Claimed,
            Some(Ok(false)) => ClaimOutcome::AlreadyRevoked,
            Some(Err(e)) => {
                warn!(
                    token = log_id(&hash),
                    error = %e,
                    "Failed to record token revocation; token stays valid until expiry"
                );
                ClaimOutcome::Degraded
            }
            None => {
                warn!(
                    token = log_id(&hash),
                    "Revocation write timed out; token stays valid until expiry"
                );
                ClaimOutcome::Degraded
            }
        }
    }

    /// Insert `token` into the denylist. Returns whether the write landed.
    pub async fn revoke(&self, token: &str, ttl: Duration) -> bool {
        let Some(store) = &self.store else {
            warn!("No revocation store configured; token stays valid until expiry");
            return false;
        };
        let hash = fingerprint(token);
        let key = keys::revoked_token(&hash);

        match self.bounded(store.set(&key, MARKER, ttl)).await {
            Some(Ok(())) => {
                debug!(token = log_id(&hash), ttl_secs = ttl.as_secs(), "Token revoked");
                true
            }
            Some(Err(e)) => {
                warn!(
                    token = log_id(&hash),
                    error = %e,
                    "Failed to record token revocation; token stays valid until expiry"
                );
                false
            }
            None => {
                warn!(
                    token = log_id(&hash),
                    "Revocation write timed out; token stays valid until expiry"
                );
                false
            }
        }
    }

    /// Probe the store.
    pub async fn health(&self) -> StoreHealth {
        let Some(store) = &self.store else {
            return StoreHealth::Disabled;
        };
        match self.bounded(store.health_check()).await {
            Some(Ok(true)) => StoreHealth::Ok,
            _ => StoreHealth::Degraded,
        }
    }
}
