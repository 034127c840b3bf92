//! Application state shared across all handlers.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use gatehouse_auth::{
    AccessGuard, ActivityRecorder, PasswordPolicy, RevocationList, SessionAuthority, TokenService,
};
use gatehouse_core::config::AppConfig;
use gatehouse_core::result::AppResult;
use gatehouse_database::CredentialStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token issuance and verification
    pub tokens: Arc<TokenService>,
    /// Login, refresh, logout and administrator management
    pub authority: Arc<SessionAuthority>,
    /// Per-request authentication and role checks
    pub guard: AccessGuard,
    /// Background task persisting activity events
    activity_worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppState {
    /// Assemble the state from already-constructed stores.
    ///
    /// Fails when the auth configuration is unusable.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        revocations: RevocationList,
        activity: ActivityRecorder,
        activity_worker: Option<JoinHandle<()>>,
    ) -> AppResult<Self> {
        let tokens = Arc::new(TokenService::new(&config.auth, revocations)?);
        let authority = Arc::new(SessionAuthority::new(
            store,
            Arc::clone(&tokens),
            PasswordPolicy::new(&config.auth),
            activity,
        ));

        Ok(Self {
            config: Arc::new(config),
            guard: AccessGuard::new(Arc::clone(&tokens)),
            tokens,
            authority,
            activity_worker: Arc::new(Mutex::new(activity_worker)),
        })
    }

    /// Take the activity worker handle. Only the first caller gets it.
    ///
    /// The worker finishes once every clone of this state is dropped.
    pub async fn take_activity_worker(&self) -> Option<JoinHandle<()>> {
        self.activity_worker.lock().await.take()
    }
}
