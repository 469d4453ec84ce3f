use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use super::ensure_id;
use crate::access;
use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::middleware::{AuthContext, user_auth};
use crate::models::{ActivityAction, AddMember, CreateProject, ProjectDetails, UpdateProject};
use crate::util::ActivityBuilder;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/members", post(add_member))
        .route("/projects/{id}/members/{user_id}", delete(remove_member))
        .layer(middleware::from_fn_with_state(state, user_auth))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<ProjectDetails>>> {
    let conn = state.db.get()?;
    let projects = queries::list_projects(&conn, &access::project_list_scope(&ctx.user))?;
    Ok(Json(queries::project_details(&conn, projects)?))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetails>> {
    ensure_id(&id, msg::PROJECT_NOT_FOUND)?;
    let conn = state.db.get()?;

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_view_project(&ctx.user, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED_VIEW_PROJECT.into()));
    }

    Ok(Json(queries::project_detail(&conn, project)?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<ProjectDetails>)> {
    if !access::can_create_project(&ctx.user) {
        return Err(ctx.role_denied());
    }
    let input = input.validate(&ctx.user.id)?;

    let mut conn = state.db.get()?;
    let project = queries::create_project(&mut conn, &ctx.user.id, &input)?;

    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::ProjectCreated)
        .description(format!("Project \"{}\" was created", project.name))
        .project(&project.id)
        .save()?;

    tracing::info!(project_id = %project.id, user_id = %ctx.user.id, "project created");

    Ok((StatusCode::CREATED, Json(queries::project_detail(&conn, project)?)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProject>,
) -> Result<Json<ProjectDetails>> {
    ensure_id(&id, msg::PROJECT_NOT_FOUND)?;
    let mut conn = state.db.get()?;

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_manage_project(&ctx.user, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED_UPDATE_PROJECT.into()));
    }

    let patch = input.into_patch(&project.owner_id)?;
    let project = queries::update_project(&mut conn, &id, &patch)?
        .or_not_found(msg::PROJECT_NOT_FOUND)?;

    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::ProjectUpdated)
        .description(format!("Project \"{}\" was updated", project.name))
        .project(&project.id)
        .save()?;

    tracing::info!(project_id = %project.id, user_id = %ctx.user.id, "project updated");

    Ok(Json(queries::project_detail(&conn, project)?))
}

/// Deletes the project and every task in it.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    ensure_id(&id, msg::PROJECT_NOT_FOUND)?;
    let mut conn = state.db.get()?;

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_manage_project(&ctx.user, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED_DELETE_PROJECT.into()));
    }

    let tasks_removed =
        queries::delete_project_cascade(&mut conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;

    // No project reference: the row is gone.
    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::ProjectDeleted)
        .description(format!("Project \"{}\" was deleted", project.name))
        .save()?;

    tracing::info!(
        project_id = %id,
        user_id = %ctx.user.id,
        tasks_removed,
        "project deleted"
    );

    Ok(Json(json!({ "message": "Project and associated tasks removed" })))
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<AddMember>,
) -> Result<Json<ProjectDetails>> {
    ensure_id(&id, msg::PROJECT_NOT_FOUND)?;
    let conn = state.db.get()?;

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_manage_project(&ctx.user, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED.into()));
    }

    let user_id = input.user_id.trim();
    let user = queries::get_user_by_id(&conn, user_id)?.or_not_found(msg::USER_NOT_FOUND)?;
    if project.is_owner(&user.id) || project.has_member(&user.id) {
        return Err(AppError::BadRequest(msg::ALREADY_MEMBER.into()));
    }

    queries::add_project_member(&conn, &project.id, &user.id)?;

    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::MemberAdded)
        .description(format!("A member was added to project \"{}\"", project.name))
        .project(&project.id)
        .save()?;

    tracing::info!(project_id = %project.id, member_id = %user.id, "member added");

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    Ok(Json(queries::project_detail(&conn, project)?))
}

/// Removing a non-member is not an error; the activity is still recorded.
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<ProjectDetails>> {
    ensure_id(&id, msg::PROJECT_NOT_FOUND)?;
    let conn = state.db.get()?;

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    if !access::can_manage_project(&ctx.user, &project) {
        return Err(AppError::Forbidden(msg::NOT_AUTHORIZED.into()));
    }

    let removed = queries::remove_project_member(&conn, &project.id, &user_id)?;
    if !removed {
        tracing::debug!(
            project_id = %project.id,
            user_id = %user_id,
            "remove_member: not a member"
        );
    }

    ActivityBuilder::new(&conn, &ctx.user.id, ActivityAction::MemberRemoved)
        .description(format!("A member was removed from project \"{}\"", project.name))
        .project(&project.id)
        .save()?;

    let project = queries::get_project_by_id(&conn, &id)?.or_not_found(msg::PROJECT_NOT_FOUND)?;
    Ok(Json(queries::project_detail(&conn, project)?))
}
