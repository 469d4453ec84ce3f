pub mod activities;
pub mod projects;
pub mod tasks;
pub mod users;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::id::is_valid_prefixed_id;

/// All API routes. Everything except `/health` requires a bearer token.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(projects::router(state.clone()))
        .merge(tasks::router(state.clone()))
        .merge(activities::router(state.clone()))
        .merge(users::router(state))
}

/// The full service: routes plus CORS for the dashboard and request tracing.
pub fn app(state: AppState, console_origins: &[String]) -> Router {
    router(state.clone())
        .layer(cors_layer(console_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS limited to the configured dashboard origins. Invalid entries are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origin_values: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(origin_values)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
        ])
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Ids that could never have been issued are reported as missing.
fn ensure_id(id: &str, not_found: &str) -> Result<()> {
    if is_valid_prefixed_id(id) {
        Ok(())
    } else {
        Err(AppError::NotFound(not_found.into()))
    }
}
