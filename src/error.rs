use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// User-facing error messages.
pub mod msg {
    pub const MISSING_TOKEN: &str = "Not authorized, no token";
    pub const INVALID_TOKEN: &str = "Not authorized, token failed";

    pub const PROJECT_NOT_FOUND: &str = "Project not found";
    pub const TASK_NOT_FOUND: &str = "Task not found";
    pub const USER_NOT_FOUND: &str = "User not found";

    pub const NOT_AUTHORIZED: &str = "Not authorized";
    pub const NOT_AUTHORIZED_VIEW_PROJECT: &str = "Not authorized to view this project";
    pub const NOT_AUTHORIZED_UPDATE_PROJECT: &str = "Not authorized to update this project";
    pub const NOT_AUTHORIZED_DELETE_PROJECT: &str = "Not authorized to delete this project";
    pub const NOT_AUTHORIZED_CREATE_TASK: &str = "Not authorized to create tasks in this project";
    pub const NOT_AUTHORIZED_UPDATE_TASK: &str = "Not authorized to update this task";
    pub const NOT_AUTHORIZED_DELETE_TASK: &str = "Not authorized to delete this task";

    pub const ALREADY_MEMBER: &str = "User is already a member";
    pub const NAME_EMPTY: &str = "Project name is required";
    pub const TITLE_EMPTY: &str = "Task title is required";
    pub const USER_NAME_EMPTY: &str = "Name is required";
    pub const EMAIL_EMPTY: &str = "Email is required";
    pub const INVALID_EMAIL_FORMAT: &str = "Invalid email format";
    pub const EMAIL_EXISTS: &str = "Email already exists";
    pub const INVALID_STATUS: &str = "Invalid status";
    pub const INVALID_PRIORITY: &str = "Invalid priority";
    pub const INVALID_DUE_DATE: &str = "Invalid due date, expected YYYY-MM-DD";
    pub const CANNOT_DELETE_SELF: &str = "You cannot delete your own account";
    pub const USER_OWNS_PROJECTS: &str =
        "User owns projects; delete them or have an admin remove them first";

    pub const INTERNAL: &str = "Internal server error";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Pool(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => msg,
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                msg::INTERNAL.to_string()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                msg::INTERNAL.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                msg::INTERNAL.to_string()
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Turns a missing row into a 404 with the given message.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.into()))
    }
}
