//! Listing page cache
//!
//! Returns a folder listing's markup from the store when it has been fetched
//! before, and otherwise fetches it through the session and stores it.

use crate::config::Config;
use crate::session::{Renderer, Session};
use crate::storage::Store;
use crate::tree::{listing_url, Folder};
use crate::Result;
use std::time::Duration;

/// Prefix of the store keys holding listing markup
pub const MARKUP_KEY_PREFIX: &str = "folder-html:";

/// Store key for a folder's listing markup
pub fn markup_key(folder_id: &str) -> String {
    format!("{}{}", MARKUP_KEY_PREFIX, folder_id)
}

/// Hit/miss counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub fetches: u64,
}

/// Fetch-or-cache front for the session
pub struct PageCache<R, S> {
    session: Session<R>,
    store: S,
    base_url: String,
    fetch_delay: Duration,
    force_refetch: bool,
    stats: CacheStats,
}

impl<R: Renderer, S: Store> PageCache<R, S> {
    pub fn new(session: Session<R>, store: S, config: &Config) -> Self {
        Self {
            session,
            store,
            base_url: config.site.base_url.clone(),
            fetch_delay: Duration::from_millis(config.crawler.fetch_delay_ms),
            force_refetch: config.crawler.force_refetch,
            stats: CacheStats::default(),
        }
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<R> {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Gets the listing markup for `folder`
    ///
    /// A stored value is returned without touching the session unless
    /// force-refetch is on. A fetch visits the folder's listing URL, pauses
    /// for the configured fetch delay, then stores and returns the markup.
    ///
    /// # Errors
    ///
    /// Session and store errors propagate; a failed fetch never falls back
    /// to a stored value.
    pub async fn get_markup(&mut self, folder: &Folder) -> Result<String> {
        let key = markup_key(&folder.id);

        if !self.force_refetch {
            if let Some(markup) = self.store.get(&key)? {
                tracing::debug!("Cache hit for folder {}", folder.id);
                self.stats.hits += 1;
                return Ok(markup);
            }
        }

        tracing::debug!("Fetching listing for folder {}", folder.id);
        self.session
            .visit(&listing_url(&self.base_url, &folder.id))
            .await?;

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        let markup = self.session.markup().await?;
        self.store.set(&key, &markup)?;
        self.stats.fetches += 1;

        Ok(markup)
    }
}
