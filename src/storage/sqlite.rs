//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{LogEntry, Store, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    // ===== Key/Value =====

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM kv WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>> {
        // substr comparison avoids LIKE wildcards inside the prefix
        let mut stmt = self.conn.prepare(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key ASC",
        )?;

        let keys = stmt
            .query_map(params![prefix], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(keys)
    }

    // ===== Ordered Log =====

    fn append_to_ordered_log(
        &mut self,
        log_key: &str,
        score: i64,
        value: &str,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO ordered_log (log_key, score, value) VALUES (?1, ?2, ?3)",
            params![log_key, score, value],
        )?;
        Ok(())
    }

    fn ordered_log(&self, log_key: &str) -> StorageResult<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT score, value FROM ordered_log WHERE log_key = ?1 ORDER BY score ASC, id ASC",
        )?;

        let entries = stmt
            .query_map(params![log_key], |row| {
                Ok(LogEntry {
                    score: row.get(0)?,
                    value: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> SqliteStore {
        SqliteStore::new_in_memory().unwrap()
    }

    #[test]
    fn test_get_missing_key() {
        let store = create_test_store();
        assert_eq!(store.get("folder-html:1").unwrap(), None);
        assert!(!store.exists("folder-html:1").unwrap());
    }

    #[test]
    fn test_set_then_get() {
        let mut store = create_test_store();
        store.set("folder-html:1", "<html></html>").unwrap();

        assert_eq!(
            store.get("folder-html:1").unwrap().as_deref(),
            Some("<html></html>")
        );
        assert!(store.exists("folder-html:1").unwrap());
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = create_test_store();
        store.set("k", "old").unwrap();
        store.set("k", "new").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("new"));
        assert_eq!(store.keys_with_prefix("k").unwrap().len(), 1);
    }

    #[test]
    fn test_keys_with_prefix() {
        let mut store = create_test_store();
        store.set("folder-info:2", "b").unwrap();
        store.set("folder-info:1", "a").unwrap();
        store.set("file:9", "c").unwrap();
        store.set("folder-infox", "d").unwrap();

        let keys = store.keys_with_prefix("folder-info:").unwrap();
        assert_eq!(keys, vec!["folder-info:1", "folder-info:2"]);
    }

    #[test]
    fn test_keys_with_prefix_treats_wildcards_literally() {
        let mut store = create_test_store();
        store.set("a%b", "1").unwrap();
        store.set("axb", "2").unwrap();

        assert_eq!(store.keys_with_prefix("a%").unwrap(), vec!["a%b"]);
    }

    #[test]
    fn test_ordered_log_sorted_by_score() {
        let mut store = create_test_store();
        store.append_to_ordered_log("history", 30, "third").unwrap();
        store.append_to_ordered_log("history", 10, "first").unwrap();
        store.append_to_ordered_log("history", 20, "second").unwrap();
        store.append_to_ordered_log("other", 5, "elsewhere").unwrap();

        let values: Vec<String> = store
            .ordered_log("history")
            .unwrap()
            .into_iter()
            .map(|e| e.value)
            .collect();
        assert_eq!(values, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_ordered_log_keeps_duplicate_scores() {
        let mut store = create_test_store();
        store.append_to_ordered_log("history", 1, "a").unwrap();
        store.append_to_ordered_log("history", 1, "b").unwrap();

        assert_eq!(store.ordered_log("history").unwrap().len(), 2);
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huddle.db");

        {
            let mut store = SqliteStore::new(&path).unwrap();
            store.set("folder-object:root", "{}").unwrap();
        }

        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.get("folder-object:root").unwrap().as_deref(), Some("{}"));
    }
}
