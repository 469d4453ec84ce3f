use axum::{
    Router,
    extract::{Extension, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
};
use serde_json::{Value, json};

use super::ensure_id;
use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::{Json, Path};
use crate::middleware::{AuthContext, user_auth};
use crate::models::{Capability, CreateUser, CreatedUser, UpdateUserRole, User};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/assignable", get(list_assignable_users))
        .route("/users/me", get(get_me))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/role", put(update_user_role))
        .layer(middleware::from_fn_with_state(state, user_auth))
}

pub async fn get_me(Extension(ctx): Extension<AuthContext>) -> Json<User> {
    Json(ctx.user)
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<User>>> {
    ctx.require(Capability::ManageUsers)?;
    let conn = state.db.get()?;
    Ok(Json(queries::list_users(&conn)?))
}

pub async fn list_assignable_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<User>>> {
    ctx.require(Capability::ListAssignableUsers)?;
    let conn = state.db.get()?;
    Ok(Json(queries::list_assignable_users(&conn)?))
}

/// Create a user and their first API token. The token is only returned here.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<CreatedUser>)> {
    ctx.require(Capability::ManageUsers)?;

    let conn = state.db.get()?;
    let user = queries::create_user(&conn, &input)?;
    let (_, token) = queries::create_api_key(&conn, &user.id, "Default")?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        created_by = %ctx.user.id,
        key = %ctx.key_prefix,
        "user created"
    );

    Ok((StatusCode::CREATED, Json(CreatedUser { user, token })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    ctx.require(Capability::ManageUsers)?;
    ensure_id(&id, msg::USER_NOT_FOUND)?;
    let conn = state.db.get()?;
    let user = queries::get_user_by_id(&conn, &id)?.or_not_found(msg::USER_NOT_FOUND)?;
    Ok(Json(user))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserRole>,
) -> Result<Json<User>> {
    ctx.require(Capability::ManageUsers)?;
    ensure_id(&id, msg::USER_NOT_FOUND)?;
    let conn = state.db.get()?;

    let user = queries::update_user_role(&conn, &id, input.role)?
        .or_not_found(msg::USER_NOT_FOUND)?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        changed_by = %ctx.user.id,
        key = %ctx.key_prefix,
        "user role changed"
    );

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    ctx.require(Capability::ManageUsers)?;
    if id == ctx.user.id {
        return Err(AppError::BadRequest(msg::CANNOT_DELETE_SELF.into()));
    }
    ensure_id(&id, msg::USER_NOT_FOUND)?;

    let mut conn = state.db.get()?;
    if !queries::delete_user(&mut conn, &id)? {
        return Err(AppError::NotFound(msg::USER_NOT_FOUND.into()));
    }

    tracing::info!(user_id = %id, deleted_by = %ctx.user.id, key = %ctx.key_prefix, "user deleted");

    Ok(Json(json!({ "message": "User removed" })))
}
