//! Tree crawler - builds the folder tree one listing at a time
//!
//! The crawl runs in two phases so a caller can review the first-level
//! folders before committing to the full crawl:
//! 1. `crawl_root` lists only the root's immediate children
//! 2. `expand_all` descends into every child and persists the result
//!
//! Expansion is strictly depth-first and sequential. Every listing is loaded
//! through the one shared session page, so a sibling is never started until
//! the previous subtree is finished.

use crate::cache::{CacheStats, PageCache};
use crate::config::{Config, SelectorConfig};
use crate::session::Renderer;
use crate::snapshot::{self, SnapshotRecord};
use crate::storage::Store;
use crate::tree::model::{Folder, HuddleTree};
use crate::tree::parser::{extract_rows, file_from_row, folder_from_row};
use crate::Result;

/// Owns the crawl's cache, session and tree for the length of one run
pub struct Crawler<R, S> {
    cache: PageCache<R, S>,
    selectors: SelectorConfig,
    base_url: String,
    tree: HuddleTree,
    root_crawled: bool,
}

impl<R: Renderer, S: Store> Crawler<R, S> {
    /// Creates a crawler with a fresh, unexpanded tree
    pub fn new(cache: PageCache<R, S>, config: &Config) -> Self {
        Self {
            cache,
            selectors: config.selectors.clone(),
            base_url: config.site.base_url.clone(),
            tree: HuddleTree::new(&config.site.base_url),
            root_crawled: false,
        }
    }

    pub fn tree(&self) -> &HuddleTree {
        &self.tree
    }

    pub fn into_tree(self) -> HuddleTree {
        self.tree
    }

    pub fn cache(&self) -> &PageCache<R, S> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PageCache<R, S> {
        &mut self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Discovers the root's files and immediate subfolders without descending
    ///
    /// Starts over from an empty root each time it is called.
    pub async fn crawl_root(&mut self) -> Result<&Folder> {
        self.tree = HuddleTree::new(&self.base_url);
        self.root_crawled = false;

        expand_folder(&mut self.cache, &self.selectors, &mut self.tree.root, false).await?;

        self.root_crawled = true;
        tracing::info!(
            "Root listing has {} folders and {} files",
            self.tree.root.subfolders.len(),
            self.tree.root.files.len()
        );
        Ok(&self.tree.root)
    }

    /// Fully expands every first-level folder, then persists the tree
    ///
    /// Runs `crawl_root` first unless it was run since the last `expand_all`,
    /// so every call builds a new tree. Nothing is persisted unless every
    /// subtree expands without error.
    pub async fn expand_all(&mut self) -> Result<SnapshotRecord> {
        if !self.root_crawled {
            self.crawl_root().await?;
        }
        self.root_crawled = false;

        let total = self.tree.root.subfolders.len();
        for (index, child) in self.tree.root.subfolders.iter_mut().enumerate() {
            tracing::info!("Expanding {} ({}/{})", child.name, index + 1, total);
            expand_folder(&mut self.cache, &self.selectors, child, true).await?;
        }

        tracing::info!(
            "Crawl complete: {} folders, {} files ({} cached, {} fetched)",
            self.tree.root.folder_count(),
            self.tree.root.file_count(),
            self.cache.stats().hits,
            self.cache.stats().fetches
        );

        snapshot::persist(self.cache.store_mut(), &self.tree)
    }

    /// Populates `folder` from its listing, descending into children if `recursive`
    pub async fn expand(&mut self, folder: &mut Folder, recursive: bool) -> Result<()> {
        expand_folder(&mut self.cache, &self.selectors, folder, recursive).await
    }
}

/// Reads one listing into `folder` and optionally recurses depth-first
///
/// All rows are pulled out of the markup before the first child is visited,
/// since visiting replaces the page the rows came from.
async fn expand_folder<R: Renderer, S: Store>(
    cache: &mut PageCache<R, S>,
    selectors: &SelectorConfig,
    folder: &mut Folder,
    recursive: bool,
) -> Result<()> {
    let markup = cache.get_markup(folder).await?;
    let rows = extract_rows(&markup, selectors)?;

    folder.files.clear();
    folder.subfolders.clear();

    tracing::debug!(
        "Folder {} ({}) lists {} folders and {} files",
        folder.name,
        folder.id,
        rows.folders.len(),
        rows.files.len()
    );

    for row in rows.files {
        let file = file_from_row(row, &folder.id);
        folder.files.push(file);
    }

    for row in rows.folders {
        let child = folder_from_row(row, &folder.id)?;
        folder.subfolders.push(child);

        if recursive {
            if let Some(child) = folder.subfolders.last_mut() {
                Box::pin(expand_folder(cache, selectors, child, true)).await?;
            }
        }
    }

    Ok(())
}
