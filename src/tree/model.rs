//! Folder tree entities
//!
//! This module defines the folders and files a crawl discovers, and the
//! tree that owns them.

use crate::{CrawlError, Result};
use serde::{Deserialize, Serialize};

/// Id of the root folder
pub const ROOT_ID: &str = "root";

/// Parent id recorded on the root folder
///
/// Real ids are digits only, so this can never collide with one.
pub const ROOT_PARENT_ID: &str = "#root-parent";

/// Builds the listing URL for the folder with the given id
///
/// # Example
///
/// ```
/// use huddle_mapper::tree::listing_url;
///
/// assert_eq!(
///     listing_url("https://my.huddle.net/", "42"),
///     "https://my.huddle.net/#/folder/42/list"
/// );
/// ```
pub fn listing_url(base_url: &str, folder_id: &str) -> String {
    format!("{}#/folder/{}/list", base_url, folder_id)
}

/// A file row found in a folder listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub name: String,
    pub url: String,
    pub parent_id: String,
}

/// A folder and everything discovered beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Id of the folder whose listing produced this one (not the tree root)
    pub parent_id: String,
    /// In discovery order
    #[serde(default)]
    pub subfolders: Vec<Folder>,
    /// In discovery order
    #[serde(default)]
    pub files: Vec<File>,
}

impl Folder {
    /// Creates the root folder for the site at `base_url`
    pub fn root(base_url: &str) -> Self {
        Self {
            id: ROOT_ID.to_string(),
            name: ROOT_ID.to_string(),
            url: listing_url(base_url, ROOT_ID),
            parent_id: ROOT_PARENT_ID.to_string(),
            subfolders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Consumes the folder, returning it only if every scalar field is non-empty
    ///
    /// # Errors
    ///
    /// `CrawlError::FolderValidation` carrying the offending folder.
    pub fn validated(self) -> Result<Self> {
        let complete = [&self.id, &self.name, &self.url, &self.parent_id]
            .iter()
            .all(|field| !field.is_empty());

        if complete {
            Ok(self)
        } else {
            Err(CrawlError::FolderValidation {
                folder: Box::new(self),
            })
        }
    }

    /// Number of folders in this subtree, excluding this one
    pub fn folder_count(&self) -> usize {
        self.subfolders
            .iter()
            .map(|child| 1 + child.folder_count())
            .sum()
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .subfolders
                .iter()
                .map(Folder::file_count)
                .sum::<usize>()
    }

    /// Visits this folder and every descendant, parents before children
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Folder)) {
        visit(self);
        for child in &self.subfolders {
            child.walk(visit);
        }
    }
}

/// The complete folder tree of one crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuddleTree {
    #[serde(rename = "rootFolder")]
    pub root: Folder,
}

impl HuddleTree {
    /// Creates a tree holding only an unexpanded root
    pub fn new(base_url: &str) -> Self {
        Self {
            root: Folder::root(base_url),
        }
    }
}
