use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::UserRef;
use crate::error::{AppError, Result, msg};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize, AsRefStr, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    OnHold,
}

/// A project record with its member list loaded.
///
/// The owner is never stored in `members`; use [`Project::is_owner`] and
/// [`Project::has_member`] together for visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub members: Vec<String>,
    pub status: ProjectStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

/// Project with owner and members resolved to display objects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// `None` only if the owner row has gone missing.
    pub owner: Option<UserRef>,
    pub members: Vec<UserRef>,
    pub status: ProjectStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

/// Validated input for a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

impl CreateProject {
    /// Trim fields and normalize the member list for `owner_id`.
    pub fn validate(self, owner_id: &str) -> Result<NewProject> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(msg::NAME_EMPTY.into()));
        }

        Ok(NewProject {
            name,
            description: super::non_blank(self.description),
            members: normalize_members(self.members.unwrap_or_default(), owner_id),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProject {
    /// Overwrites only when non-empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Null or "" clears the description.
    #[serde(default, deserialize_with = "super::deserialize_clearable_string")]
    pub description: Option<Option<String>>,
    /// Overwrites only when non-empty.
    #[serde(default)]
    pub status: Option<String>,
    /// Replaces the whole member list when present (an empty list clears it).
    #[serde(default)]
    pub members: Option<Vec<String>>,
}

/// Fields to overwrite on a project. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub members: Option<Vec<String>>,
}

impl UpdateProject {
    pub fn into_patch(self, owner_id: &str) -> Result<ProjectPatch> {
        let status = super::non_blank(self.status)
            .map(|s| {
                s.parse::<ProjectStatus>()
                    .map_err(|_| AppError::BadRequest(msg::INVALID_STATUS.into()))
            })
            .transpose()?;

        Ok(ProjectPatch {
            name: super::non_blank(self.name),
            description: self
                .description
                .map(|d| d.map(|s| s.trim().to_string())),
            status,
            members: self.members.map(|m| normalize_members(m, owner_id)),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMember {
    pub user_id: String,
}

/// Drop blanks, duplicates and the owner while keeping first-seen order.
pub fn normalize_members(members: Vec<String>, owner_id: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(members.len());
    for id in members {
        let id = id.trim().to_string();
        if id.is_empty() || id == owner_id || out.contains(&id) {
            continue;
        }
        out.push(id);
    }
    out
}
