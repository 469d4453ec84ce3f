use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{AppError, Result, msg};

/// The three fixed roles, declared from least to most privileged so the
/// derived ordering is the privilege order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    TeamMember,
    ProjectManager,
    Admin,
}

/// Role-gated actions. Each maps to the least privileged role allowed to
/// perform it; resource ownership is checked separately in `access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    CreateProject,
    CreateTask,
    DeleteTask,
    EditAllTaskFields,
    ListAssignableUsers,
    ViewAllTasks,
    ViewAllProjects,
    ManageAnyProject,
    ManageUsers,
}

impl Capability {
    pub fn min_role(&self) -> UserRole {
        match self {
            Capability::CreateProject
            | Capability::CreateTask
            | Capability::DeleteTask
            | Capability::EditAllTaskFields
            | Capability::ListAssignableUsers
            | Capability::ViewAllTasks => UserRole::ProjectManager,
            Capability::ViewAllProjects
            | Capability::ManageAnyProject
            | Capability::ManageUsers => UserRole::Admin,
        }
    }
}

impl UserRole {
    pub fn has(&self, capability: Capability) -> bool {
        *self >= capability.min_role()
    }
}

fn validate_email_format(email: &str) -> Result<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(AppError::BadRequest(msg::EMAIL_EMPTY.into()));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    };

    if local.is_empty() || local.contains(' ') || domain.contains('@') {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(AppError::BadRequest(msg::INVALID_EMAIL_FORMAT.into()));
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Display projection of a user used when resolving references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::TeamMember
}

impl CreateUser {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest(msg::USER_NAME_EMPTY.into()));
        }
        validate_email_format(&self.email)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRole {
    pub role: UserRole,
}
