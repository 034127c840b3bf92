//! Activity log repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::activity::{ActivityEvent, ActivityLog};

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: i64,
    actor_id: Option<i64>,
    action: String,
    target_id: Option<i64>,
    details: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityLog {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            actor_id: row.actor_id,
            action: row.action,
            target_id: row.target_id,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

/// Repository for the append-only `activity_logs` table.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one event.
    pub async fn insert(&self, event: &ActivityEvent) -> AppResult<ActivityLog> {
        sqlx::query_as::<_, ActivityRow>(
            "INSERT INTO activity_logs (actor_id, action, target_id, details, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, actor_id, action, target_id, details, created_at",
        )
        .bind(event.actor_id)
        .bind(event.action.as_str())
        .bind(event.target_id)
        .bind(&event.details)
        .bind(event.occurred_at)
        .fetch_one(&self.pool)
        .await
        .map(ActivityLog::from)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record activity", e))
    }

    /// Most recent entries, newest first.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<ActivityLog>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT id, actor_id, action, target_id, details, created_at \
             FROM activity_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list activity", e))?;
        Ok(rows.into_iter().map(ActivityLog::from).collect())
    }
}
