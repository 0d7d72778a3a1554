//! Huddle-Mapper: materializes the folder tree of an authenticated Huddle site
//!
//! This crate drives a single rendered browsing session through the site's
//! folder listings, caches each listing's markup, parses it into a tree of
//! folders and files, and records the finished tree as a current snapshot
//! plus an append-only history.

pub mod cache;
pub mod config;
pub mod index;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod tree;

use thiserror::Error;

/// Main error type for Huddle-Mapper operations
///
/// Every variant is fatal to the crawl that raised it; nothing in the crate
/// retries or falls back.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Timed out after {timeout_ms}ms waiting for '{selector}' to become visible")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Could not parse a folder id from {url} (row: {raw})")]
    FolderIdParse { url: String, raw: String },

    #[error("Folder parse error, incomplete folder: {folder:?}")]
    FolderValidation { folder: Box<tree::Folder> },

    #[error("Could not parse a numeric file id from {url}")]
    FileIdParse { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}' for {field}")]
    InvalidSelector { field: String, selector: String },
}

/// Result type alias for Huddle-Mapper operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use cache::PageCache;
pub use config::Config;
pub use session::{ChromeRenderer, Renderer, Session};
pub use storage::{SqliteStore, Store};
pub use tree::{Crawler, File, Folder, HuddleTree};
