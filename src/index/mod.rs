//! Per-entity records
//!
//! Flattens a crawled tree into one store record per folder and per file so
//! individual entities can be looked up without decoding a whole snapshot.

use crate::storage::Store;
use crate::tree::{File, Folder};
use crate::{CrawlError, Result};
use serde::{Deserialize, Serialize};

/// Prefix of folder record keys
pub const FOLDER_KEY_PREFIX: &str = "folder-info:";

/// Prefix of file record keys
pub const FILE_KEY_PREFIX: &str = "file:";

/// A folder without its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub parent_id: String,
}

impl From<&Folder> for FolderRecord {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id.clone(),
            name: folder.name.clone(),
            url: folder.url.clone(),
            parent_id: folder.parent_id.clone(),
        }
    }
}

/// Counts from one indexing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub folders_written: usize,
    pub folders_skipped: usize,
    pub files_written: usize,
    pub files_skipped: usize,
}

/// Extracts a file's numeric id from the fragment after its last `#/`
///
/// # Errors
///
/// `CrawlError::FileIdParse` when that fragment is not a number.
pub fn file_id_from_url(url: &str) -> Result<String> {
    let tail = url.rsplit("#/").next().unwrap_or_default();
    if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
        Ok(tail.to_string())
    } else {
        Err(CrawlError::FileIdParse {
            url: url.to_string(),
        })
    }
}

/// Writes a record for `folder`, every descendant folder, and all their files
///
/// Existing records are left alone unless `overwrite` is set.
pub fn store_records<S: Store>(
    store: &mut S,
    folder: &Folder,
    overwrite: bool,
) -> Result<IndexSummary> {
    let mut summary = IndexSummary::default();
    store_folder(store, folder, overwrite, &mut summary)?;

    tracing::info!(
        "Indexed {} folders ({} skipped) and {} files ({} skipped)",
        summary.folders_written,
        summary.folders_skipped,
        summary.files_written,
        summary.files_skipped
    );
    Ok(summary)
}

fn store_folder<S: Store>(
    store: &mut S,
    folder: &Folder,
    overwrite: bool,
    summary: &mut IndexSummary,
) -> Result<()> {
    let key = format!("{}{}", FOLDER_KEY_PREFIX, folder.id);
    if overwrite || !store.exists(&key)? {
        let record = serde_json::to_string(&FolderRecord::from(folder))?;
        store.set(&key, &record)?;
        tracing::debug!("Stored {}", key);
        summary.folders_written += 1;
    } else {
        summary.folders_skipped += 1;
    }

    for file in &folder.files {
        store_file(store, file, overwrite, summary)?;
    }

    for child in &folder.subfolders {
        store_folder(store, child, overwrite, summary)?;
    }

    Ok(())
}

fn store_file<S: Store>(
    store: &mut S,
    file: &File,
    overwrite: bool,
    summary: &mut IndexSummary,
) -> Result<()> {
    let key = format!("{}{}", FILE_KEY_PREFIX, file_id_from_url(&file.url)?);
    if overwrite || !store.exists(&key)? {
        store.set(&key, &serde_json::to_string(file)?)?;
        tracing::debug!("Stored {}", key);
        summary.files_written += 1;
    } else {
        summary.files_skipped += 1;
    }
    Ok(())
}

/// Reads every folder record in the store, ordered by key
pub fn folder_records<S: Store>(store: &S) -> Result<Vec<FolderRecord>> {
    let mut records = Vec::new();
    for key in store.keys_with_prefix(FOLDER_KEY_PREFIX)? {
        if let Some(value) = store.get(&key)? {
            records.push(serde_json::from_str(&value)?);
        }
    }
    Ok(records)
}

/// Reads the record of the file with the given id
pub fn file_record<S: Store>(store: &S, file_id: &str) -> Result<Option<File>> {
    match store.get(&format!("{}{}", FILE_KEY_PREFIX, file_id))? {
        Some(value) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}
