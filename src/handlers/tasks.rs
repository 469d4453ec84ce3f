use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use serde_json::{Value, json};

use super::ensure_id;
use crate::access::{self, TaskEditScope};
use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path, Query};
use crate::middleware::{AuthContext, user_auth};
use crate::models::{
    ActivityAction, Capability, CreateTask, TaskDetails, TaskListQuery, UpdateTask,
    requested_status,
};
use crate::util::ActivityBuilder;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/project/{project_id}", get(list_tasks_by_project))
        .layer(middleware::from_fn_with_state(state, user_auth))
}

/// Team members only ever see their own tasks, whatever project is asked for.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskDetails>>> {
    let project_id = query
        .project_id
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    let conn = state.db.get()?;
    let tasks = queries::list_tasks(&conn, &access::task_list_scope(&ctx.user, project_id))?;
    Ok(Json(queries::task_details(&conn, tasks)?))
}

pub async fn list_tasks_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<TaskDetails>>> {
    let conn = state.db.get()?;
    let tasks = queries::list_tasks_by_project(&conn, &project_id)?;
    Ok(Json(queries::task_details(&conn, tasks)?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskDetails>> {
    ensure_id(&id, msg::TASK_NOT_FOUND)?;
    let conn = state.db.get()?;
    let task = queries::get_task_by_id(&conn, &id)?.or_not_found(msg::TASK_NOT_FOUND)?;
    Ok(Json(queries::task_detail(&conn, task)?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<TaskDetails>)> {
    if !access::can_create_task(&ctx.user) {
        return Err(ctx.role_denied());
    }
    let input = input.validate()?;

    let conn = state.db.get()?;
    let project = queries::get_project_by_id(&conn, &input.project_id)?
        .or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_manage_project(&ctx.user, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED_CREATE_TASK.into()));
    }
    if let Some(assignee) = &input.assigned_to {
        queries::get_user_by_id(&conn, assignee)?.or_not_found(msg::USER_NOT_FOUND)?;
    }

    let task = queries::create_task(&conn, &input)?;

    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::TaskCreated)
        .description(format!(
            "Task \"{}\" was created in project \"{}\"",
            task.title, project.name
        ))
        .project(&project.id)
        .task(&task.id)
        .save()?;

    tracing::info!(
        task_id = %task.id,
        project_id = %project.id,
        user_id = %ctx.user.id,
        "task created"
    );

    Ok((StatusCode::CREATED, Json(queries::task_detail(&conn, task)?)))
}

/// Assigned team members may move the status; managers and admins edit
/// every field. The body stays untyped until the caller's scope is known.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<TaskDetails>> {
    ensure_id(&id, msg::TASK_NOT_FOUND)?;
    let conn = state.db.get()?;

    let task = queries::get_task_by_id(&conn, &id)?.or_not_found(msg::TASK_NOT_FOUND)?;
    let project = queries::get_project_by_id(&conn, &task.project_id)?
        .or_not_found(msg::PROJECT_NOT_FOUND)?;

    let scope = access::task_edit_scope(&ctx.user, &task, &project, state.strict_task_updates);
    let task = match scope {
        TaskEditScope::Denied => {
            return Err(AppError::Forbidden(msg::NOT_AUTHORIZED_UPDATE_TASK.into()));
        }
        TaskEditScope::StatusOnly => {
            let Some(status) = requested_status(&body)? else {
                tracing::debug!(task_id = %task.id, "no status in update, nothing to do");
                return Ok(Json(queries::task_detail(&conn, task)?));
            };

            let old_status = task.status;
            let task = queries::update_task_status(&conn, &id, status)?
                .or_not_found(msg::TASK_NOT_FOUND)?;

            ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::TaskStatusChanged)
                .description(format!(
                    "Task \"{}\" status changed from \"{}\" to \"{}\"",
                    task.title, old_status, status
                ))
                .project(&project.id)
                .task(&task.id)
                .save()?;

            tracing::info!(
                task_id = %task.id,
                from = %old_status,
                to = %status,
                "task status changed"
            );
            task
        }
        TaskEditScope::AllFields => {
            let patch = UpdateTask::from_body(body)?.into_patch()?;
            if let Some(Some(assignee)) = &patch.assigned_to {
                queries::get_user_by_id(&conn, assignee)?.or_not_found(msg::USER_NOT_FOUND)?;
            }

            let task = queries::update_task(&conn, &id, &patch)?
                .or_not_found(msg::TASK_NOT_FOUND)?;

            ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::TaskUpdated)
                .description(format!("Task \"{}\" was updated", task.title))
                .project(&project.id)
                .task(&task.id)
                .save()?;

            tracing::info!(task_id = %task.id, user_id = %ctx.user.id, "task updated");
            task
        }
    };

    Ok(Json(queries::task_detail(&conn, task)?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    ctx.require(Capability::DeleteTask)?;
    ensure_id(&id, msg::TASK_NOT_FOUND)?;
    let conn = state.db.get()?;

    let task = queries::get_task_by_id(&conn, &id)?.or_not_found(msg::TASK_NOT_FOUND)?;
    let project = queries::get_project_by_id(&conn, &task.project_id)?
        .or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_manage_task(&ctx.user, &task, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED_DELETE_TASK.into()));
    }

    queries::delete_task(&conn, &id)?;

    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::TaskDeleted)
        .description(format!(
            "Task \"{}\" was deleted from project \"{}\"",
            task.title, project.name
        ))
        .project(&project.id)
        .save()?;

    tracing::info!(
        task_id = %task.id,
        project_id = %project.id,
        user_id = %ctx.user.id,
        "task deleted"
    );

    Ok(Json(json!({ "message": "Task removed" })))
}
