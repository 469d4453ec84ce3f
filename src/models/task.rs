use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use super::{ProjectRef, UserRef};
use crate::error::{AppError, Result, msg};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, AsRefStr, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, AsRefStr, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub project_id: String,
    pub assigned_to: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_to.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    pub title: String,
}

/// Task with its project and assignee resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub project: Option<ProjectRef>,
    pub assigned_to: Option<UserRef>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (the date part is kept).
pub fn parse_due_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| AppError::BadRequest(msg::INVALID_DUE_DATE.into()))
}

fn parse_status(raw: &str) -> Result<TaskStatus> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(msg::INVALID_STATUS.into()))
}

fn parse_priority(raw: &str) -> Result<TaskPriority> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(msg::INVALID_PRIORITY.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Validated input for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: String,
    pub assigned_to: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

impl CreateTask {
    pub fn validate(self) -> Result<NewTask> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest(msg::TITLE_EMPTY.into()));
        }

        let priority = match super::non_blank(self.priority) {
            Some(p) => parse_priority(&p)?,
            None => TaskPriority::default(),
        };

        let due_date = super::non_blank(self.due_date)
            .map(|d| parse_due_date(&d))
            .transpose()?;

        Ok(NewTask {
            title,
            description: super::non_blank(self.description),
            project_id: self.project_id.trim().to_string(),
            assigned_to: super::non_blank(self.assigned_to),
            priority,
            due_date,
        })
    }
}

/// Raw update body. `title`, `status` and `priority` ignore empty strings;
/// `description`, `assignedTo` and `dueDate` are cleared by null or "".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_clearable_string")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_clearable_string")]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::deserialize_clearable_string")]
    pub due_date: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// The `status` of a raw update body. Other fields are not inspected, so
/// an assignee's update succeeds whatever else the body carries.
pub fn requested_status(body: &Value) -> Result<Option<TaskStatus>> {
    match body.get("status") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => parse_status(raw.trim()).map(Some),
        Some(_) => Err(AppError::BadRequest(msg::INVALID_STATUS.into())),
    }
}

impl UpdateTask {
    pub fn from_body(body: Value) -> Result<Self> {
        serde_json::from_value(body).map_err(|e| {
            AppError::BadRequest(format!(
                "Failed to deserialize the JSON body into the target type: {e}"
            ))
        })
    }

    pub fn into_patch(self) -> Result<TaskPatch> {
        let status = super::non_blank(self.status)
            .map(|s| parse_status(&s))
            .transpose()?;
        let priority = super::non_blank(self.priority)
            .map(|p| parse_priority(&p))
            .transpose()?;
        let due_date = match self.due_date {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_due_date(&raw)?)),
        };

        Ok(TaskPatch {
            title: super::non_blank(self.title),
            description: self
                .description
                .map(|d| d.map(|s| s.trim().to_string())),
            status,
            priority,
            assigned_to: self
                .assigned_to
                .map(|a| a.map(|s| s.trim().to_string())),
            due_date,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    #[serde(default)]
    pub project_id: Option<String>,
}
