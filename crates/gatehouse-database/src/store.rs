//! The credential store contract and a latency-bounding decorator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use gatehouse_core::config::DatabaseConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::{NewUser, User, UserRole};

/// Persistence contract for administrative identities.
///
/// Implementations enforce username uniqueness themselves and report a
/// duplicate as `ErrorKind::Conflict`. `update` and `delete` on an unknown
/// id report `ErrorKind::NotFound`.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new identity and return it with its assigned id.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Look up a live identity by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Look up a live identity by id.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Overwrite username, password hash and role of an existing identity.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Remove an identity.
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// All live identities ordered by id.
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Number of live identities.
    async fn count(&self) -> AppResult<u64>;

    /// Number of live identities holding `role`.
    async fn count_by_role(&self, role: UserRole) -> AppResult<u64>;
}

/// Wraps any [`CredentialStore`] so that every call is bounded by a timeout.
///
/// Reads that time out are retried once after `backoff`. Writes are never
/// retried. A timeout surfaces as `ErrorKind::ServiceUnavailable`.
#[derive(Debug, Clone)]
pub struct BoundedStore {
    inner: Arc<dyn CredentialStore>,
    timeout: Duration,
    backoff: Duration,
}

impl BoundedStore {
    /// Wrap `inner` with explicit limits.
    pub fn new(inner: Arc<dyn CredentialStore>, timeout: Duration, backoff: Duration) -> Self {
        Self {
            inner,
            timeout,
            backoff,
        }
    }

    /// Wrap `inner` with the limits from configuration.
    pub fn from_config(inner: Arc<dyn CredentialStore>, config: &DatabaseConfig) -> Self {
        let timeout = config.query_timeout();
        Self::new(inner, timeout, timeout / 16)
    }

    async fn write<T, F>(&self, op: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation = op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Credential store write timed out"
                );
                Err(AppError::service_unavailable("Credential store timed out"))
            }
        }
    }

    async fn read<T, F, Fut>(&self, op: &'static str, call: F) -> AppResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        if let Ok(result) = tokio::time::timeout(self.timeout, call()).await {
            return result;
        }
        warn!(operation = op, "Credential store read timed out, retrying once");
        tokio::time::sleep(self.backoff).await;
        match tokio::time::timeout(self.timeout, call()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation = op, "Credential store read timed out after retry");
                Err(AppError::service_unavailable("Credential store timed out"))
            }
        }
    }
}

#[async_trait]
impl CredentialStore for BoundedStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.write("create", self.inner.create(user)).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.read("find_by_username", || self.inner.find_by_username(username))
            .await
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.read("find_by_id", || self.inner.find_by_id(id)).await
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        self.write("update", self.inner.update(user)).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.write("delete", self.inner.delete(id)).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        self.read("list", || self.inner.list()).await
    }

    async fn count(&self) -> AppResult<u64> {
        self.read("count", || self.inner.count()).await
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<u64> {
        self.read("count_by_role", || self.inner.count_by_role(role))
            .await
    }
}
