//! Activity log entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of session and administration activity that get recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Login,
    LoginFailed,
    Refresh,
    Logout,
    AdminCreated,
    AdminDeleted,
    PasswordUpdated,
}

impl ActivityAction {
    /// Dotted action name stored in the `action` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "session.login",
            Self::LoginFailed => "session.login_failed",
            Self::Refresh => "session.refresh",
            Self::Logout => "session.logout",
            Self::AdminCreated => "admin.create",
            Self::AdminDeleted => "admin.delete",
            Self::PasswordUpdated => "admin.password",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event handed to the activity recorder from the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// The user who performed the action, when known.
    pub actor_id: Option<i64>,
    /// What happened.
    pub action: ActivityAction,
    /// The user the action targeted, if different from the actor.
    pub target_id: Option<i64>,
    /// Free-form details (never secrets).
    pub details: Option<serde_json::Value>,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Build an event stamped with the current time.
    pub fn new(action: ActivityAction, actor_id: Option<i64>) -> Self {
        Self {
            actor_id,
            action,
            target_id: None,
            details: None,
            occurred_at: Utc::now(),
        }
    }

    /// Attach a target user id.
    pub fn with_target(mut self, target_id: i64) -> Self {
        self.target_id = Some(target_id);
        self
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// A persisted activity log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub actor_id: Option<i64>,
    pub action: String,
    pub target_id: Option<i64>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
