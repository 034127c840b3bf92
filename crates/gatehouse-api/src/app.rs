//! Application builder: wires stores, auth and router into a running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use gatehouse_auth::activity::DEFAULT_CAPACITY;
use gatehouse_auth::{ActivitySink, ActivityWorker, RevocationList, TracingActivitySink};
use gatehouse_cache::CacheManager;
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_database::migration::run_migrations;
use gatehouse_database::{
    ActivityLogRepository, BoundedStore, CredentialStore, DatabasePool, MemoryCredentialStore,
    PgCredentialStore,
};

use crate::router::build_router;
use crate::state::AppState;

/// How long shutdown waits for queued activity events.
const ACTIVITY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Construct every dependency named by `config` and assemble the state.
///
/// An unreachable revocation store is not fatal: the service starts without
/// one and logs the degradation. A missing signing secret or an unreachable
/// credential database is fatal.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    // ── Credential store ──────────────────────────────────────
    let (store, sink): (Arc<dyn CredentialStore>, Arc<dyn ActivitySink>) =
        match config.database.provider.as_str() {
            "memory" => {
                warn!("Using the in-memory credential store; accounts are lost on restart");
                (
                    Arc::new(MemoryCredentialStore::new()),
                    Arc::new(TracingActivitySink),
                )
            }
            "postgres" => {
                let db = DatabasePool::connect(&config.database).await?;
                run_migrations(db.pool()).await?;
                (
                    Arc::new(PgCredentialStore::new(db.pool().clone())),
                    Arc::new(ActivityLogRepository::new(db.pool().clone())),
                )
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown database provider: '{other}'. Supported: postgres, memory"
                )));
            }
        };
    let store: Arc<dyn CredentialStore> =
        Arc::new(BoundedStore::from_config(store, &config.database));

    // ── Revocation store ──────────────────────────────────────
    let cache = match CacheManager::new(&config.cache).await {
        Ok(cache) => cache.map(Arc::new),
        Err(e) if e.kind == ErrorKind::Configuration => return Err(e),
        Err(e) => {
            warn!(
                error = %e,
                "Revocation store unreachable at start-up; continuing without it"
            );
            None
        }
    };
    let revocations = RevocationList::new(cache, &config.cache);

    // ── Activity recording ────────────────────────────────────
    let (recorder, worker) = ActivityWorker::spawn(sink, DEFAULT_CAPACITY);

    AppState::new(config, store, revocations, recorder, Some(worker))
}

/// Wait for the activity worker to flush its queue.
///
/// Every `AppState` clone must be dropped first, or the worker never sees its
/// channel close and this returns only after the timeout.
pub async fn drain_activity(worker: Option<JoinHandle<()>>) {
    let Some(worker) = worker else {
        return;
    };
    match tokio::time::timeout(ACTIVITY_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => debug!("Activity queue drained"),
        Ok(Err(e)) => error!(error = %e, "Activity worker failed"),
        Err(_) => warn!(
            timeout_secs = ACTIVITY_DRAIN_TIMEOUT.as_secs(),
            "Activity worker did not finish in time; queued events may be lost"
        ),
    }
}

/// Runs the Gatehouse server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!("Starting Gatehouse server...");
    let addr = config.server.bind_address();

    let state = build_state(config).await?;
    let worker = state.take_activity_worker().await;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "Gatehouse server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    drain_activity(worker).await;
    info!("Gatehouse server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
