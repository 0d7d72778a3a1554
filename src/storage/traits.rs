//! Storage traits and error types
//!
//! This module defines the key/value interface the crawler persists through
//! and the associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One entry of an append-only ordered log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub score: i64,
    pub value: String,
}

/// Key/value store with an append-only ordered log
///
/// Writes to a single key are atomic; nothing else is assumed about
/// transactions across keys.
pub trait Store {
    // ===== Key/Value =====

    /// Gets the value stored under `key`, if any
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Returns true if a value is stored under `key`
    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Lists every key starting with `prefix`, sorted ascending
    fn keys_with_prefix(&self, prefix: &str) -> StorageResult<Vec<String>>;

    // ===== Ordered Log =====

    /// Appends `value` to the log named `log_key` with ordering `score`
    ///
    /// Entries are never replaced, even when a score repeats.
    fn append_to_ordered_log(&mut self, log_key: &str, score: i64, value: &str)
        -> StorageResult<()>;

    /// Reads the log named `log_key`, ascending by score then insertion
    fn ordered_log(&self, log_key: &str) -> StorageResult<Vec<LogEntry>>;
}
