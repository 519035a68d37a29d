use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS sets (
      id TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cards (
      set_id TEXT NOT NULL,
      id TEXT NOT NULL,
      position INTEGER NOT NULL,
      question TEXT NOT NULL,
      answer TEXT NOT NULL,
      PRIMARY KEY (set_id, id),
      FOREIGN KEY (set_id) REFERENCES sets(id)
    );

    CREATE INDEX IF NOT EXISTS idx_cards_set_position ON cards(set_id, position);
    "#,
    )?;

    // Migration: sets created before edits were tracked have no updated_at
    add_column_if_missing(conn, "sets", "updated_at", "TEXT")?;

    Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
        .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
    if !column_exists(conn, table, column) {
        conn.execute(
            &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
            [],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert!(column_exists(&conn, "sets", "updated_at"));
        assert!(column_exists(&conn, "cards", "position"));
    }

    #[test]
    fn test_adds_missing_column_to_old_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE sets (id TEXT PRIMARY KEY, name TEXT NOT NULL, created_at TEXT NOT NULL);")
            .unwrap();
        assert!(!column_exists(&conn, "sets", "updated_at"));
        run_migrations(&conn).unwrap();
        assert!(column_exists(&conn, "sets", "updated_at"));
    }
}
