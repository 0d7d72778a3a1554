//! Storage module for persisting crawl data
//!
//! This module provides the key/value store the crawler writes through:
//! - Cached listing markup
//! - The current tree snapshot and its timestamped history
//! - Flat per-folder and per-file records

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{LogEntry, Store, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a store backed by the SQLite file at `path`
///
/// Missing parent directories are created first.
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    SqliteStore::new(path)
}
