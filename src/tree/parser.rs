//! Listing markup parser
//!
//! This module turns a rendered folder listing into plain rows and derives
//! folder names and ids from them:
//! - Row extraction with CSS selectors
//! - Label normalization (`"12 Engineering"` becomes `"Engineering (12)"`)
//! - Folder id extraction from listing URLs

use crate::config::SelectorConfig;
use crate::tree::model::{File, Folder};
use crate::{ConfigError, CrawlError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]*)\s(.*)$").expect("Invalid label regex"));

static FOLDER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/folder/([0-9]+)/list(?:[/?#]|$)").expect("Invalid folder id regex")
});

/// A row as it appears in the listing, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// First text node of the row's anchor
    pub label: String,
    /// The anchor's `href`, as written
    pub href: String,
}

/// All rows of one listing, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRows {
    pub files: Vec<RawRow>,
    pub folders: Vec<RawRow>,
}

/// Extracts file and folder rows from listing markup
///
/// The parsed document does not outlive this call; callers get owned rows
/// they can keep across later navigation.
///
/// # Errors
///
/// `CrawlError::Config` if a row selector does not parse.
pub fn extract_rows(markup: &str, selectors: &SelectorConfig) -> Result<ListingRows> {
    let file_selector = parse_selector("file-row", &selectors.file_row)?;
    let folder_selector = parse_selector("folder-row", &selectors.folder_row)?;

    let document = Html::parse_document(markup);

    Ok(ListingRows {
        files: document.select(&file_selector).map(raw_row).collect(),
        folders: document.select(&folder_selector).map(raw_row).collect(),
    })
}

fn parse_selector(field: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| {
        CrawlError::Config(ConfigError::InvalidSelector {
            field: field.to_string(),
            selector: selector.to_string(),
        })
    })
}

fn raw_row(element: ElementRef<'_>) -> RawRow {
    let label = element
        .children()
        .find_map(|node| node.value().as_text().map(|text| text.to_string()))
        .unwrap_or_default();
    let href = element.value().attr("href").unwrap_or_default().to_string();

    RawRow { label, href }
}

/// Normalizes a folder label by moving a leading number to a trailing parenthetical
///
/// # Example
///
/// ```
/// use huddle_mapper::tree::normalize_name;
///
/// assert_eq!(normalize_name("12 Engineering"), "Engineering (12)");
/// assert_eq!(normalize_name("Engineering"), "Engineering");
/// ```
pub fn normalize_name(label: &str) -> String {
    let moved = LEADING_NUMBER.replace(label.trim(), "$2 ($1)");
    let name = moved.strip_suffix(" ()").unwrap_or(&moved);
    name.trim().to_string()
}

/// Extracts the numeric folder id from a listing URL
///
/// Returns `None` if the URL is not a `/folder/<digits>/list` link;
/// [`folder_from_row`] turns that into a fatal error carrying the row.
pub fn folder_id_from_url(url: &str) -> Option<String> {
    FOLDER_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
}

/// Builds a validated child folder from a listing row
///
/// # Errors
///
/// `CrawlError::FolderIdParse` when the href carries no folder id and
/// `CrawlError::FolderValidation` when any field comes out empty.
pub fn folder_from_row(row: RawRow, parent_id: &str) -> Result<Folder> {
    let id = folder_id_from_url(&row.href).ok_or_else(|| CrawlError::FolderIdParse {
        url: row.href.clone(),
        raw: format!("{:?}", row),
    })?;

    Folder {
        id,
        name: normalize_name(&row.label),
        url: row.href,
        parent_id: parent_id.to_string(),
        subfolders: Vec::new(),
        files: Vec::new(),
    }
    .validated()
}

/// Builds a file from a listing row; file rows are not validated
pub fn file_from_row(row: RawRow, parent_id: &str) -> File {
    File {
        name: row.label,
        url: row.href,
        parent_id: parent_id.to_string(),
    }
}
