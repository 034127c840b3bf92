//! Fire-and-forget activity recording.
//!
//! The request path hands events to [`ActivityRecorder::record`], which never
//! waits. An [`ActivityWorker`] task drains the queue into an
//! [`ActivitySink`]. A full queue or a failing sink loses events; it never
//! fails the request that produced them.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use gatehouse_core::result::AppResult;
use gatehouse_database::ActivityLogRepository;
use gatehouse_entity::activity::ActivityEvent;

/// Default queue depth between the request path and the worker.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Destination for recorded activity.
#[async_trait]
pub trait ActivitySink: Send + Sync + 'static {
    async fn write(&self, event: &ActivityEvent) -> AppResult<()>;
}

/// Writes each event as a structured `info` log line.
#[derive(Debug, Clone, Default)]
pub struct TracingActivitySink;

#[async_trait]
impl ActivitySink for TracingActivitySink {
    async fn write(&self, event: &ActivityEvent) -> AppResult<()> {
        info!(
            target: "gatehouse::activity",
            action = event.action.as_str(),
            actor_id = ?event.actor_id,
            target_id = ?event.target_id,
            occurred_at = %event.occurred_at,
            "Activity"
        );
        Ok(())
    }
}

#[async_trait]
impl ActivitySink for ActivityLogRepository {
    async fn write(&self, event: &ActivityEvent) -> AppResult<()> {
        self.insert(event).await.map(|_| ())
    }
}

/// Cheap, cloneable handle for submitting events.
#[derive(Debug, Clone)]
pub struct ActivityRecorder {
    tx: Option<mpsc::Sender<ActivityEvent>>,
}

impl ActivityRecorder {
    /// A recorder that drops everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Queue `event` without waiting.
    pub fn record(&self, event: ActivityEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(action = event.action.as_str(), "Activity queue full; event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(
                    action = event.action.as_str(),
                    "Activity worker stopped; event dropped"
                );
            }
        }
    }
}

/// Background task draining recorded events into a sink.
pub struct ActivityWorker;

impl ActivityWorker {
    /// Start the worker. It exits once every recorder clone is dropped.
    pub fn spawn(
        sink: Arc<dyn ActivitySink>,
        capacity: usize,
    ) -> (ActivityRecorder, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ActivityEvent>(capacity.max(1));
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.write(&event).await {
                    warn!(
                        action = event.action.as_str(),
                        error = %e,
                        "Failed to persist activity"
                    );
                }
            }
            info!("Activity worker stopped");
        });
        (ActivityRecorder { tx: Some(tx) }, handle)
    }
}
