//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never carry a
//! copy of the schema.

use rusqlite::Connection;
use tempfile::TempDir;

/// Test environment with a migrated card store in a temporary directory.
///
/// The directory (and database file) is removed when dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Card store connection with the full schema
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("flashdeck.db"))?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }
}
