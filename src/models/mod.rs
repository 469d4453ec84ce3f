mod activity;
mod api_key;
mod project;
mod task;
mod user;

pub use activity::*;
pub use api_key::*;
pub use project::*;
pub use task::*;
pub use user::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a clearable string field where:
/// - Field absent in JSON → None (leave unchanged)
/// - Field present with null or "" → Some(None) (clear)
/// - Field present with text → Some(Some(text))
fn deserialize_clearable_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Only called when the field is present.
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(value.filter(|s| !s.trim().is_empty())))
}

/// Treat blank strings like an absent field.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
