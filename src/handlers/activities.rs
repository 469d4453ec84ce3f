use axum::{Router, extract::State, middleware, routing::get};

use crate::db::{AppState, queries};
use crate::error::Result;
use crate::extractors::{Json, Path, Query};
use crate::middleware::user_auth;
use crate::models::{ActivityDetails, ActivityQuery, DEFAULT_ACTIVITY_LIMIT};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/activities", get(list_activities))
        .route("/activities/project/{project_id}", get(list_project_activities))
        .layer(middleware::from_fn_with_state(state, user_auth))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityDetails>>> {
    let conn = state.db.get()?;
    let activities = queries::list_activities(&conn, query.project_id(), query.limit())?;
    Ok(Json(queries::activity_details(&conn, activities)?))
}

pub async fn list_project_activities(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ActivityDetails>>> {
    let conn = state.db.get()?;
    let activities = queries::list_activities(&conn, Some(&project_id), DEFAULT_ACTIVITY_LIMIT)?;
    Ok(Json(queries::activity_details(&conn, activities)?))
}
