pub mod schema;
pub mod sets;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use schema::run_migrations;
pub use sets::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug, Error)]
#[error("Database unavailable")]
pub struct DbLockError;

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).log_warn("Could not create database directory");
    }

    // Create backup before migrations if database exists
    if path.exists() {
        let backup_path = path.with_extension("db.backup");
        std::fs::copy(path, &backup_path).log_warn("Could not create database backup");
    }

    let conn = Connection::open(path)?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// In-memory database with the full schema, for tests and ephemeral runs
pub fn init_memory_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()?;
    run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_db_creates_parent_and_backup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("flashdeck.db");

        let pool = init_db(&path).unwrap();
        {
            let conn = try_lock(&pool).unwrap();
            create_set(&conn, "Biology", &[]).unwrap();
        }
        drop(pool);
        assert!(path.exists());

        let pool = init_db(&path).unwrap();
        assert!(path.with_extension("db.backup").exists());
        let conn = try_lock(&pool).unwrap();
        assert_eq!(list_sets(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_log_warn() {
        let failed: std::result::Result<i64, String> = Err("boom".to_string());
        assert_eq!(failed.log_warn("test"), None);
        let ok: std::result::Result<i64, String> = Ok(7);
        assert_eq!(ok.log_warn("test"), Some(7));
    }
}
