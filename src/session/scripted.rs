//! In-process scripted renderer
//!
//! Serves canned markup per URL and simulates the identity provider's
//! two-step login form, recording every call it receives. Test double for
//! the session, cache and crawler; only built with `cfg(test)` or the
//! `test-util` feature.

use crate::config::SelectorConfig;
use crate::session::renderer::Renderer;
use crate::{CrawlError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// One call received by a [`ScriptedRenderer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererCall {
    Navigate(String),
    WaitForVisible(String),
    Type { selector: String, text: String },
    Click(String),
    CurrentUrl,
    CurrentMarkup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginStep {
    Username,
    Password,
}

/// Renderer that replays fixed pages
pub struct ScriptedRenderer {
    pages: HashMap<String, String>,
    selectors: SelectorConfig,
    login_url: Option<String>,
    logged_in: bool,
    login_step: Option<LoginStep>,
    pending_url: Option<String>,
    current_url: String,
    visible: Vec<String>,
    calls: Vec<RendererCall>,
}

impl ScriptedRenderer {
    /// Creates a renderer that never asks for a login
    pub fn new(selectors: SelectorConfig) -> Self {
        Self {
            pages: HashMap::new(),
            selectors,
            login_url: None,
            logged_in: false,
            login_step: None,
            pending_url: None,
            current_url: "about:blank".to_string(),
            visible: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Redirects every navigation to `login_url` until the login form is completed
    pub fn requiring_login(mut self, login_url: &str) -> Self {
        self.login_url = Some(login_url.to_string());
        self
    }

    /// Serves `markup` when `url` is visited
    pub fn with_page(mut self, url: &str, markup: &str) -> Self {
        self.pages.insert(url.to_string(), markup.to_string());
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    /// URLs navigated to so far, in order
    pub fn navigations(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RendererCall::Navigate(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn show_app(&mut self, url: String) {
        self.current_url = url;
        self.visible = vec![self.selectors.header.clone(), self.selectors.app_ready.clone()];
        if self.logged_in {
            self.visible.push(self.selectors.login_complete.clone());
        }
    }

    fn show_login(&mut self, step: LoginStep) {
        self.login_step = Some(step);
        let field = match step {
            LoginStep::Username => self.selectors.username_field.clone(),
            LoginStep::Password => self.selectors.password_field.clone(),
        };
        self.visible = vec![
            self.selectors.header.clone(),
            field,
            self.selectors.continue_button.clone(),
        ];
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.calls.push(RendererCall::Navigate(url.to_string()));

        if !self.pages.contains_key(url) {
            return Err(CrawlError::Navigation {
                url: url.to_string(),
                message: "no scripted page".to_string(),
            });
        }

        match self.login_url.clone() {
            Some(login_url) if !self.logged_in => {
                self.pending_url = Some(url.to_string());
                self.current_url = login_url;
                self.show_login(LoginStep::Username);
            }
            _ => self.show_app(url.to_string()),
        }
        Ok(())
    }

    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.calls
            .push(RendererCall::WaitForVisible(selector.to_string()));

        if self.visible.iter().any(|s| s == selector) {
            Ok(())
        } else {
            Err(CrawlError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.calls.push(RendererCall::Type {
            selector: selector.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.calls.push(RendererCall::Click(selector.to_string()));

        if selector != self.selectors.continue_button {
            return Ok(());
        }

        match self.login_step {
            Some(LoginStep::Username) => self.show_login(LoginStep::Password),
            Some(LoginStep::Password) => {
                self.login_step = None;
                self.logged_in = true;
                let target = self.pending_url.take().unwrap_or_default();
                self.show_app(target);
            }
            None => {}
        }
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.calls.push(RendererCall::CurrentUrl);
        Ok(self.current_url.clone())
    }

    async fn current_markup(&mut self) -> Result<String> {
        self.calls.push(RendererCall::CurrentMarkup);
        Ok(self
            .pages
            .get(&self.current_url)
            .cloned()
            .unwrap_or_else(|| "<html><body>login</body></html>".to_string()))
    }
}
