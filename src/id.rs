//! Prefixed ID generation for Taskboard entities.
//!
//! Format: `tb_{entity}_{uuid_simple}` (32 hex chars, no hyphens).

use uuid::Uuid;

const ALL_PREFIXES: &[&str] = &["tb_usr_", "tb_proj_", "tb_task_", "tb_act_", "tb_key_"];

/// Cheap format check used to reject garbage path segments before a lookup.
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    User,
    Project,
    Task,
    Activity,
    ApiKey,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "tb_usr",
            Self::Project => "tb_proj",
            Self::Task => "tb_task",
            Self::Activity => "tb_act",
            Self::ApiKey => "tb_key",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}
