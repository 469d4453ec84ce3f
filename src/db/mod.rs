mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Managers must own the parent project to edit a task.
    pub strict_task_updates: bool,
}

fn with_foreign_keys(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = with_foreign_keys(SqliteConnectionManager::file(database_path));
    Pool::builder().max_size(10).build(manager)
}

/// Pool over a private in-memory database shared by all of its connections.
pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = with_foreign_keys(SqliteConnectionManager::memory());
    Pool::builder().max_size(4).build(manager)
}
