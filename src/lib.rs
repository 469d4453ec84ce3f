//! Taskboard - role-based project and task management API
//!
//! This library provides the core functionality for the Taskboard service,
//! including the SQLite store, role-based access predicates, the activity log
//! and the HTTP handlers.

pub mod access;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod middleware;
pub mod models;
pub mod seed;
pub mod util;
