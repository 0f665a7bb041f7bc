//! Read-only storage contracts consumed by the scheduler and stats tooling.

use chrono::{DateTime, Utc};
use quadrant_core::{Task, UserId, timing};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fetch failure for one session. Isolated to that session and retried on
/// the next cycle with no backoff change.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task store unavailable: {0}")]
    Unavailable(String),
    #[error("task store request timed out")]
    Timeout,
    #[error("credentials rejected for this session")]
    Unauthorized,
}

/// Projection of an incomplete task that carries a deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineView {
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl DeadlineView {
    /// Days-left annotation, always on the UTC calendar.
    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        timing::days_until(self.deadline, now)
    }
}

/// Read access to tasks. Nothing in this crate mutates storage.
pub trait TaskStore {
    /// Incomplete tasks with a deadline, for one user.
    async fn pending_deadlines(&self, user: UserId) -> Result<Vec<DeadlineView>, StoreError>;

    /// Full task rows for bucketization and stats, for one user.
    async fn tasks_for_user(&self, user: UserId) -> Result<Vec<Task>, StoreError>;

    /// Every task row, across users.
    async fn all_tasks(&self) -> Result<Vec<Task>, StoreError>;
}
