//! Authorization predicates.
//!
//! Every function here is pure: it looks only at the acting user and the
//! already-loaded resource. Handlers load first, decide here, and only then
//! mutate.

use crate::models::{Capability, Project, Task, User};

pub fn can_view_project(user: &User, project: &Project) -> bool {
    user.role.has(Capability::ViewAllProjects)
        || project.is_owner(&user.id)
        || project.has_member(&user.id)
}

/// Owner or admin. Governs project update/delete, membership changes, and
/// task create/delete inside the project.
pub fn can_manage_project(user: &User, project: &Project) -> bool {
    user.role.has(Capability::ManageAnyProject) || project.is_owner(&user.id)
}

pub fn can_create_project(user: &User) -> bool {
    user.role.has(Capability::CreateProject)
}

pub fn can_create_task(user: &User) -> bool {
    user.role.has(Capability::CreateTask)
}

pub fn can_manage_task(user: &User, _task: &Task, project: &Project) -> bool {
    can_manage_project(user, project)
}

pub fn can_update_task_status_only(user: &User, task: &Task) -> bool {
    !user.role.has(Capability::EditAllTaskFields) && task.is_assigned_to(&user.id)
}

/// What a user may change on an existing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEditScope {
    StatusOnly,
    AllFields,
    Denied,
}

/// Decide the edit scope for `user` on `task`.
///
/// With `strict` set, managers also need to own the parent project (admins
/// always pass).
pub fn task_edit_scope(user: &User, task: &Task, project: &Project, strict: bool) -> TaskEditScope {
    if user.role.has(Capability::EditAllTaskFields) {
        if strict && !can_manage_task(user, task, project) {
            return TaskEditScope::Denied;
        }
        return TaskEditScope::AllFields;
    }

    if can_update_task_status_only(user, task) {
        TaskEditScope::StatusOnly
    } else {
        TaskEditScope::Denied
    }
}

/// Which projects a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    All,
    /// Projects owned by, or including as member, the given user.
    Involving(String),
}

pub fn project_list_scope(user: &User) -> ProjectScope {
    if user.role.has(Capability::ViewAllProjects) {
        ProjectScope::All
    } else {
        ProjectScope::Involving(user.id.clone())
    }
}

/// Which tasks a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    /// Everything, optionally narrowed to one project.
    All { project_id: Option<String> },
    /// Only tasks assigned to this user. Any project filter is ignored.
    AssignedTo(String),
}

pub fn task_list_scope(user: &User, project_id: Option<String>) -> TaskScope {
    if user.role.has(Capability::ViewAllTasks) {
        TaskScope::All { project_id }
    } else {
        TaskScope::AssignedTo(user.id.clone())
    }
}
