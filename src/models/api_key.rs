use serde::Serialize;

use super::User;

/// Bearer credential for a user. Only the hash is stored.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub prefix: String,
    pub key_hash: String,
    pub created_at: i64,
    pub last_used_at: Option<i64>,
}

/// Response when creating a user (includes the first token, shown only once)
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}
