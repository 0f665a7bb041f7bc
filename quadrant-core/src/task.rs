//! Task model with a derived Eisenhower quadrant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quadrant::{Quadrant, classify};
use crate::timing;

pub type TaskId = i64;

/// Core task type.
///
/// Fields are private so `quadrant` can only ever be a function of
/// `(important, deadline)` at the last mutation: callers go through the
/// mutators, which re-derive it as part of the same change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: Option<String>,
    important: bool,
    deadline: Option<DateTime<Utc>>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    quadrant: Quadrant,
    created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        important: bool,
        deadline: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            important,
            deadline,
            completed: false,
            completed_at: None,
            quadrant: classify(important, deadline, now),
            created_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Rebuild a task from stored fields, re-deriving the quadrant at `now`.
    /// Storage adapters use this; the quadrant still cannot be supplied.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: TaskId,
        title: impl Into<String>,
        description: Option<String>,
        important: bool,
        deadline: Option<DateTime<Utc>>,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description,
            important,
            deadline,
            completed,
            completed_at,
            quadrant: classify(important, deadline, now),
            created_at,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn important(&self) -> bool {
        self.important
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Title/description edits never touch the quadrant.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_important(&mut self, important: bool, now: DateTime<Utc>) {
        self.important = important;
        self.reclassify(now);
    }

    pub fn set_deadline(&mut self, deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.deadline = deadline;
        self.reclassify(now);
    }

    /// Mark done and stamp the completion instant as one change.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(now);
    }

    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        timing::days_remaining(self.deadline, now)
    }

    pub fn is_urgent(&self, now: DateTime<Utc>) -> bool {
        timing::is_urgent(self.deadline, now)
    }

    fn reclassify(&mut self, now: DateTime<Utc>) {
        self.quadrant = classify(self.important, self.deadline, now);
    }
}
