//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Models implement `FromRow` to describe how they are built from a row;
//! the `*_COLS` constants list the columns in the order each impl expects.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

fn parse_date(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<Option<NaiveDate>> {
    row.get::<_, Option<String>>(col)?
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                rusqlite::Error::InvalidColumnType(
                    col,
                    col_name.to_string(),
                    rusqlite::types::Type::Text,
                )
            })
        })
        .transpose()
}

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str = "id, name, email, role, created_at, updated_at";

pub const API_KEY_COLS: &str =
    "id, user_id, name, key_prefix, key_hash, created_at, last_used_at";

/// Project columns; `members` is loaded separately from `project_members`.
pub const PROJECT_COLS: &str = "id, name, description, owner_id, status, created_at, updated_at";

pub const TASK_COLS: &str = "id, title, description, project_id, assigned_to, status, priority, due_date, created_at, updated_at";

pub const ACTIVITY_COLS: &str =
    "id, action, description, user_id, project_id, task_id, created_at";

// ============ FromRow Implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: parse_enum(row, 3, "role")?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl FromRow for UserRef {
    /// Expects `id, name, email`.
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(UserRef {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
        })
    }
}

impl FromRow for ApiKey {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ApiKey {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            prefix: row.get(3)?,
            key_hash: row.get(4)?,
            created_at: row.get(5)?,
            last_used_at: row.get(6)?,
        })
    }
}

impl FromRow for Project {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            owner_id: row.get(3)?,
            members: Vec::new(),
            status: parse_enum(row, 4, "status")?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for ProjectRef {
    /// Expects `id, name`.
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ProjectRef {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

impl FromRow for Task {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            project_id: row.get(3)?,
            assigned_to: row.get(4)?,
            status: parse_enum(row, 5, "status")?,
            priority: parse_enum(row, 6, "priority")?,
            due_date: parse_date(row, 7, "due_date")?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl FromRow for TaskRef {
    /// Expects `id, title`.
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TaskRef {
            id: row.get(0)?,
            title: row.get(1)?,
        })
    }
}

impl FromRow for Activity {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activity {
            id: row.get(0)?,
            action: parse_enum(row, 1, "action")?,
            description: row.get(2)?,
            user_id: row.get(3)?,
            project_id: row.get(4)?,
            task_id: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
