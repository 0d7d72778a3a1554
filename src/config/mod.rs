//! Configuration module for Huddle-Mapper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use huddle_mapper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("huddle.toml")).unwrap();
//! println!("Fetch delay: {}ms", config.crawler.fetch_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, Credentials, OutputConfig, SelectorConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, PASSWORD_ENV,
    USERNAME_ENV,
};
