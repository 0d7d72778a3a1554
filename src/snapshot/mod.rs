//! Snapshot persistence
//!
//! A finished tree is written twice: under the "current" key, which each
//! crawl overwrites, and under a per-run key whose timestamp is appended to
//! an ordered history log. History is never pruned.

use crate::storage::Store;
use crate::tree::HuddleTree;
use crate::Result;
use chrono::Utc;

/// Store key of the most recent snapshot
pub const CURRENT_KEY: &str = "folder-object:root";

/// Ordered log of snapshot timestamps
pub const HISTORY_LOG_KEY: &str = "folder-object:history";

/// Store key of the snapshot taken at `timestamp` (milliseconds since the epoch)
pub fn history_key(timestamp: i64) -> String {
    format!("{}:{}", CURRENT_KEY, timestamp)
}

/// Location of one persisted snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Milliseconds since the epoch; strictly increasing per store
    pub timestamp: i64,
    pub key: String,
}

/// Writes `tree` as the current snapshot and appends it to the history
///
/// # Returns
///
/// * `Ok(SnapshotRecord)` - Where the history copy was written
/// * `Err(CrawlError)` - Serialization or store failure
pub fn persist<S: Store>(store: &mut S, tree: &HuddleTree) -> Result<SnapshotRecord> {
    persist_at(store, tree, Utc::now().timestamp_millis())
}

/// Same as [`persist`] with an explicit clock reading
///
/// If `now` is not later than the newest history entry, the newest entry
/// plus one is used so every snapshot stays individually addressable.
pub fn persist_at<S: Store>(
    store: &mut S,
    tree: &HuddleTree,
    now: i64,
) -> Result<SnapshotRecord> {
    let encoded = serde_json::to_string(tree)?;

    let newest = store
        .ordered_log(HISTORY_LOG_KEY)?
        .last()
        .map(|entry| entry.score);
    let timestamp = match newest {
        Some(score) if score >= now => score + 1,
        _ => now,
    };
    let key = history_key(timestamp);

    store.set(CURRENT_KEY, &encoded)?;
    store.set(&key, &encoded)?;
    store.append_to_ordered_log(HISTORY_LOG_KEY, timestamp, &key)?;

    tracing::info!("Stored snapshot {} ({} bytes)", key, encoded.len());
    Ok(SnapshotRecord { timestamp, key })
}

/// Loads the current snapshot, if a crawl has ever been persisted
pub fn load_current<S: Store>(store: &S) -> Result<Option<HuddleTree>> {
    load_key(store, CURRENT_KEY)
}

/// Loads the snapshot taken at `timestamp`
pub fn load_at<S: Store>(store: &S, timestamp: i64) -> Result<Option<HuddleTree>> {
    load_key(store, &history_key(timestamp))
}

/// Lists every persisted snapshot, oldest first
pub fn history<S: Store>(store: &S) -> Result<Vec<SnapshotRecord>> {
    let records = store
        .ordered_log(HISTORY_LOG_KEY)?
        .into_iter()
        .map(|entry| SnapshotRecord {
            timestamp: entry.score,
            key: entry.value,
        })
        .collect();
    Ok(records)
}

fn load_key<S: Store>(store: &S, key: &str) -> Result<Option<HuddleTree>> {
    match store.get(key)? {
        Some(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
        None => Ok(None),
    }
}
