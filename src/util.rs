//! Shared utility functions for request handling.

use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::{Activity, ActivityAction};

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Builder for activity feed entries.
///
/// # Example
/// ```ignore
/// ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::TaskCreated)
///     .description(format!("Task \"{}\" was created", task.title))
///     .project(&task.project_id)
///     .task(&task.id)
///     .save()?;
/// ```
pub struct ActivityBuilder<'a> {
    conn: &'a Connection,
    user_id: &'a str,
    action: ActivityAction,
    description: String,
    project_id: Option<&'a str>,
    task_id: Option<&'a str>,
}

impl<'a> ActivityBuilder<'a> {
    pub fn new(conn: &'a Connection, user_id: &'a str, action: ActivityAction) -> Self {
        Self {
            conn,
            user_id,
            action,
            description: String::new(),
            project_id: None,
            task_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn project(mut self, project_id: &'a str) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn task(mut self, task_id: &'a str) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn save(self) -> Result<Activity> {
        queries::create_activity(
            self.conn,
            self.action,
            &self.description,
            self.user_id,
            self.project_id,
            self.task_id,
        )
    }
}
