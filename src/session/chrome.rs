//! Headless Chrome renderer
//!
//! Launches Chrome through the DevTools protocol on first use and keeps one
//! browser and one page for the rest of the run.

use crate::session::renderer::Renderer;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Interval between visibility checks while waiting on a selector
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Renderer backed by a single Chrome page
pub struct ChromeRenderer {
    headless: bool,
    inner: Option<ChromeSession>,
}

struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeRenderer {
    /// Creates a renderer; the browser itself is not started until first use
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            inner: None,
        }
    }

    /// Closes the browser if it was ever launched
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.inner.take() {
            session.browser.close().await.map_err(browser_error)?;
            session.handler.abort();
            tracing::debug!("Browser closed");
        }
        Ok(())
    }

    async fn page(&mut self) -> Result<&Page> {
        if self.inner.is_none() {
            self.inner = Some(ChromeSession::launch(self.headless).await?);
        }
        self.inner
            .as_ref()
            .map(|session| &session.page)
            .ok_or_else(|| CrawlError::Browser("browser session unavailable".to_string()))
    }
}

impl ChromeSession {
    async fn launch(headless: bool) -> Result<Self> {
        tracing::info!("Launching browser (headless: {})", headless);

        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(CrawlError::Browser)?;

        let (browser, mut events) = Browser::launch(config).await.map_err(browser_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser event loop stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(browser_error)?;

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let page = self.page().await?;
        page.goto(url).await.map_err(|e| CrawlError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let script = visibility_script(selector)?;
        let page = self.page().await?;
        let started = Instant::now();

        loop {
            let visible: bool = page
                .evaluate(script.as_str())
                .await
                .map_err(browser_error)?
                .into_value()?;

            if visible {
                return Ok(());
            }

            if started.elapsed() >= timeout {
                return Err(CrawlError::SelectorTimeout {
                    selector: selector.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let page = self.page().await?;
        let element = page.find_element(selector).await.map_err(browser_error)?;
        element.click().await.map_err(browser_error)?;
        element.type_str(text).await.map_err(browser_error)?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        let page = self.page().await?;
        let element = page.find_element(selector).await.map_err(browser_error)?;
        element.click().await.map_err(browser_error)?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        let page = self.page().await?;
        let url = page.url().await.map_err(browser_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn current_markup(&mut self) -> Result<String> {
        let page = self.page().await?;
        page.content().await.map_err(browser_error)
    }
}

fn browser_error(e: chromiumoxide::error::CdpError) -> CrawlError {
    CrawlError::Browser(e.to_string())
}

/// Builds a script that is true when `selector` matches a rendered, visible element
fn visibility_script(selector: &str) -> Result<String> {
    let literal = serde_json::to_string(selector)?;
    Ok(format!(
        "(() => {{
            const el = document.querySelector({literal});
            if (!el) return false;
            const style = window.getComputedStyle(el);
            if (style.display === 'none' || style.visibility === 'hidden') return false;
            const rect = el.getBoundingClientRect();
            return rect.width > 0 || rect.height > 0;
        }})()"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_script_quotes_selector() {
        let script = visibility_script(r#"[data-part="header"]"#).unwrap();
        assert!(script.contains(r#"document.querySelector("[data-part=\"header\"]")"#));
    }

    #[test]
    fn test_renderer_starts_without_browser() {
        let renderer = ChromeRenderer::new(true);
        assert!(renderer.inner.is_none());
    }
}
