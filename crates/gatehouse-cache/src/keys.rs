//! Key builders for every entry Gatehouse writes to the store.
//!
//! Backend prefixes (such as the Redis `key_prefix`) are applied by the
//! backend, not here.

/// Denylist entry for a revoked token, keyed by its SHA-256 hex digest.
pub fn revoked_token(token_hash: &str) -> String {
    format!("revoked:{token_hash}")
}
