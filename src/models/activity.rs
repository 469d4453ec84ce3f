use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{ProjectRef, TaskRef, UserRef};

/// Default and maximum page sizes for activity feeds.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
pub const MAX_ACTIVITY_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityAction {
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskStatusChanged,
    MemberAdded,
    MemberRemoved,
}

/// Append-only activity row. Project and task ids are not foreign keys and
/// may point at rows that no longer exist.
#[derive(Debug, Clone)]
pub struct Activity {
    pub id: String,
    pub action: ActivityAction,
    pub description: String,
    pub user_id: String,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    pub id: String,
    pub action: ActivityAction,
    pub description: String,
    pub user: Option<UserRef>,
    pub project: Option<ProjectRef>,
    pub task: Option<TaskRef>,
    pub created_at: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ActivityQuery {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
            .clamp(1, MAX_ACTIVITY_LIMIT)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
