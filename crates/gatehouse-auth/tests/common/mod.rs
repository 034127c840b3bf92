//! Shared fixtures: an authority wired to in-memory stores.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gatehouse_auth::{
    AccessGuard, ActivityRecorder, PasswordPolicy, RevocationList, SessionAuthority, TokenService,
};
use gatehouse_cache::CacheManager;
use gatehouse_cache::memory::MemoryCacheProvider;
use gatehouse_core::config::{AuthConfig, CacheConfig, MemoryCacheConfig};
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::CacheProvider;
use gatehouse_database::{CredentialStore, MemoryCredentialStore};

pub const SECRET: &str = "integration-test-secret";
/// Also satisfies the opt-in strict profile for super administrators.
pub const ROOT_PASSWORD: &str = "vK9#qLm2$Wz7!pR4";

pub struct Harness {
    pub authority: SessionAuthority,
    pub guard: AccessGuard,
    pub tokens: Arc<TokenService>,
    pub store: Arc<MemoryCredentialStore>,
}

impl Harness {
    /// Memory credential store and memory revocation store.
    pub fn new() -> Self {
        let provider: Arc<dyn CacheProvider> =
            Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
        Self::with_cache(Some(provider))
    }

    /// Memory stores, with the strict profile switched on for super administrators.
    pub fn strict() -> Self {
        let provider: Arc<dyn CacheProvider> =
            Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
        Self::build(
            Some(provider),
            PasswordPolicy::default().with_strict_super_admins(true),
        )
    }

    /// Memory credential store with the given revocation backend.
    pub fn with_cache(provider: Option<Arc<dyn CacheProvider>>) -> Self {
        Self::build(provider, PasswordPolicy::default())
    }

    fn build(provider: Option<Arc<dyn CacheProvider>>, policy: PasswordPolicy) -> Self {
        let manager = provider.map(|p| Arc::new(CacheManager::from_provider(p)));
        let cache_config = CacheConfig {
            operation_timeout_ms: 50,
            retry_backoff_ms: 5,
            ..CacheConfig::default()
        };
        let revocations = RevocationList::new(manager, &cache_config);
        let tokens =
            Arc::new(TokenService::new(&AuthConfig::with_secret(SECRET), revocations).unwrap());
        let store = Arc::new(MemoryCredentialStore::new());
        let authority = SessionAuthority::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            Arc::clone(&tokens),
            policy,
            ActivityRecorder::disabled(),
        );
        Self {
            authority,
            guard: AccessGuard::new(Arc::clone(&tokens)),
            tokens,
            store,
        }
    }
}

/// A revocation backend that is always down.
#[derive(Debug, Default)]
pub struct UnreachableCache;

#[async_trait]
impl CacheProvider for UnreachableCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("connection refused"))
    }

    async fn set_nx(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        Err(AppError::cache("connection refused"))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::cache("connection refused"))
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        Err(AppError::cache("connection refused"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Err(AppError::cache("connection refused"))
    }
}

/// A revocation backend that never answers.
#[derive(Debug, Default)]
pub struct HangingCache;

#[async_trait]
impl CacheProvider for HangingCache {
    async fn get(&self, _key: &str) -> AppResult<Option<String>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        std::future::pending().await
    }

    async fn set_nx(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<bool> {
        std::future::pending().await
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        std::future::pending().await
    }

    async fn exists(&self, _key: &str) -> AppResult<bool> {
        std::future::pending().await
    }

    async fn health_check(&self) -> AppResult<bool> {
        std::future::pending().await
    }
}
