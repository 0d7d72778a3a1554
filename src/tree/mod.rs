//! Folder tree module
//!
//! This module contains the tree model and the logic that builds it:
//! - Folder, file and tree entities
//! - Listing markup parsing and label/id derivation
//! - The two-phase, depth-first crawler

mod crawler;
mod model;
mod parser;

pub use crawler::Crawler;
pub use model::{listing_url, File, Folder, HuddleTree, ROOT_ID, ROOT_PARENT_ID};
pub use parser::{
    extract_rows, file_from_row, folder_from_row, folder_id_from_url, normalize_name,
    ListingRows, RawRow,
};
