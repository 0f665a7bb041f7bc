//! HTTP client for the task backend, implementing the scheduler's read-only
//! `TaskStore` contract.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quadrant_core::{Task, UserId};
use quadrant_sched::{DeadlineView, StoreError, TaskStore};
use serde::Deserialize;
use tracing::warn;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        user: Option<UserId>,
    ) -> Result<T, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.get(&url).bearer_auth(&self.token);
        if let Some(user) = user {
            req = req.query(&[("user_id", user)]);
        }
        let resp = req.send().await.map_err(to_store_error)?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }

        let resp = resp.error_for_status().map_err(to_store_error)?;
        resp.json::<T>().await.map_err(to_store_error)
    }
}

fn to_store_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Unavailable(e.to_string())
    }
}

/// Task row as the backend serializes it.
#[derive(Debug, Deserialize)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    is_important: bool,
    deadline_at: Option<String>,
    completed: bool,
    completed_at: Option<String>,
    created_at: String,
}

impl TaskRow {
    /// `None` when a timestamp is malformed; the caller skips the row rather
    /// than aborting the batch.
    fn into_task(self, now: DateTime<Utc>) -> Option<Task> {
        let deadline = match self.deadline_at.as_deref() {
            Some(raw) => Some(parse_utc(raw).ok()?),
            None => None,
        };
        let completed_at = self.completed_at.as_deref().and_then(|raw| parse_utc(raw).ok());
        let created_at = parse_utc(&self.created_at).ok()?;

        Some(Task::restore(
            self.id,
            self.title,
            self.description,
            self.is_important,
            deadline,
            self.completed,
            completed_at,
            created_at,
            now,
        ))
    }
}

/// Deadline row from the pending-deadlines endpoint.
#[derive(Debug, Deserialize)]
struct DeadlineRow {
    title: String,
    description: Option<String>,
    created_at: String,
    deadline_at: String,
}

impl DeadlineRow {
    fn into_view(self) -> Option<DeadlineView> {
        let deadline = parse_utc(&self.deadline_at).ok()?;
        let created_at = parse_utc(&self.created_at).ok()?;
        Some(DeadlineView {
            title: self.title,
            description: self.description,
            created_at,
            deadline,
        })
    }
}

fn parse_utc(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

fn tasks_from_rows(rows: Vec<TaskRow>) -> Vec<Task> {
    let now = Utc::now();
    let mut tasks = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id;
        match row.into_task(now) {
            Some(task) => tasks.push(task),
            None => warn!(task_id = id, "skipping task with malformed timestamps"),
        }
    }
    tasks
}

impl TaskStore for ApiClient {
    async fn pending_deadlines(&self, user: UserId) -> Result<Vec<DeadlineView>, StoreError> {
        let rows: Vec<DeadlineRow> = self.get_json("/stats/deadlines", Some(user)).await?;
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let title = row.title.clone();
            match row.into_view() {
                Some(view) => views.push(view),
                None => warn!(%title, "skipping task with malformed deadline"),
            }
        }
        Ok(views)
    }

    async fn tasks_for_user(&self, user: UserId) -> Result<Vec<Task>, StoreError> {
        let rows: Vec<TaskRow> = self.get_json("/tasks", Some(user)).await?;
        Ok(tasks_from_rows(rows))
    }

    async fn all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let rows: Vec<TaskRow> = self.get_json("/tasks", None).await?;
        Ok(tasks_from_rows(rows))
    }
}
