//! API token generation and hashing.
//!
//! Tokens are only ever shown once at creation; the database keeps a
//! domain-separated SHA-256 digest for lookup.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Length of the visible token prefix stored alongside the hash.
pub const TOKEN_PREFIX_LEN: usize = 12;

/// Generate a new opaque API token (`tb_` + 64 hex chars).
pub fn generate_api_token() -> String {
    format!(
        "tb_{}{}",
        Uuid::new_v4().as_simple(),
        Uuid::new_v4().as_simple()
    )
}

/// Hash a secret for storage and lookup.
pub fn hash_secret(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"taskboard-v1:");
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
