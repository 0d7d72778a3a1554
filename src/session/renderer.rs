//! Renderer abstraction
//!
//! A renderer owns one page of a JavaScript-capable browser. Every call is a
//! suspension point, and callers never issue two calls at once.

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Operations the crawler needs from a page-rendering engine
#[async_trait]
pub trait Renderer: Send {
    /// Navigates the page to `url`
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Suspends until `selector` matches a visible element
    ///
    /// Returns `CrawlError::SelectorTimeout` once `timeout` has elapsed.
    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Types `text` into the element matched by `selector`
    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Clicks the element matched by `selector`
    async fn click(&mut self, selector: &str) -> Result<()>;

    /// The URL the page currently shows (after any redirects)
    async fn current_url(&mut self) -> Result<String>;

    /// The page's current rendered markup
    async fn current_markup(&mut self) -> Result<String>;
}
