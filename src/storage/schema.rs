//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Huddle-Mapper store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Plain key/value pairs (markup cache, snapshots, per-entity records)
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Append-only ordered logs (snapshot history)
CREATE TABLE IF NOT EXISTS ordered_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    log_key TEXT NOT NULL,
    score INTEGER NOT NULL,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ordered_log_key_score ON ordered_log(log_key, score);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["kv", "ordered_log"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
