use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result, msg};
use crate::models::{Capability, User};
use crate::util::extract_bearer_token;

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// Visible prefix of the API key used, for logs.
    pub key_prefix: String,
}

impl AuthContext {
    /// Role gate. Ownership checks live in `access`.
    pub fn require(&self, capability: Capability) -> Result<()> {
        if self.user.role.has(capability) {
            Ok(())
        } else {
            Err(self.role_denied())
        }
    }

    /// The 403 returned when the caller's role is below a route's gate.
    pub fn role_denied(&self) -> AppError {
        AppError::Forbidden(format!(
            "Role '{}' is not authorized to access this route",
            self.user.role
        ))
    }
}

pub async fn user_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized(msg::MISSING_TOKEN.into()))?
        .to_string();

    let (user, key) = {
        let conn = state.db.get()?;
        queries::get_user_by_api_key(&conn, &token)?
            .ok_or_else(|| AppError::Unauthorized(msg::INVALID_TOKEN.into()))?
    };

    tracing::debug!(user_id = %user.id, key = %key.prefix, "authenticated request");

    request.extensions_mut().insert(AuthContext {
        user,
        key_prefix: key.prefix,
    });

    Ok(next.run(request).await)
}
