//! Authenticated browsing session
//!
//! Wraps the single renderer page and guarantees that when [`Session::visit`]
//! returns, the page shows authenticated content.

use crate::config::{Config, Credentials, SelectorConfig};
use crate::session::renderer::Renderer;
use crate::Result;
use std::time::Duration;

/// Authentication state of a session
///
/// The only transition is `Unauthenticated -> Authenticated`, taken once a
/// login completes. It is never reversed within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    /// The condition a navigation waits on before its URL is inspected
    pub fn landing_condition(&self) -> Condition {
        match self {
            Self::Unauthenticated => Condition::Header,
            Self::Authenticated => Condition::AppReady,
        }
    }
}

/// UI conditions the session waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Header shown both logged out and logged in
    Header,
    /// In-app element shown only after login
    AppReady,
    LoginUsername,
    LoginPassword,
    LoginContinue,
    /// Search widget shown once the login form is done
    LoginComplete,
}

impl Condition {
    /// The CSS selector that satisfies this condition
    pub fn selector<'a>(&self, selectors: &'a SelectorConfig) -> &'a str {
        match self {
            Self::Header => &selectors.header,
            Self::AppReady => &selectors.app_ready,
            Self::LoginUsername => &selectors.username_field,
            Self::LoginPassword => &selectors.password_field,
            Self::LoginContinue => &selectors.continue_button,
            Self::LoginComplete => &selectors.login_complete,
        }
    }
}

/// The crawl's one browsing session
///
/// All navigation goes through [`Session::visit`].
pub struct Session<R> {
    renderer: R,
    state: AuthState,
    selectors: SelectorConfig,
    credentials: Credentials,
    login_host: String,
    settle_delay: Duration,
    timeout: Duration,
}

impl<R: Renderer> Session<R> {
    /// Creates a session around `renderer` using the site, login and selector settings
    pub fn new(renderer: R, config: &Config) -> Self {
        Self {
            renderer,
            state: AuthState::Unauthenticated,
            selectors: config.selectors.clone(),
            credentials: config.credentials.clone(),
            login_host: config.site.login_host.clone(),
            settle_delay: Duration::from_millis(config.crawler.login_settle_ms),
            timeout: Duration::from_millis(config.crawler.selector_timeout_ms),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Navigates to `url`, logging in first if the site redirects to the identity provider
    ///
    /// # Errors
    ///
    /// Any selector timeout or navigation failure is returned as-is; nothing
    /// is retried.
    pub async fn visit(&mut self, url: &str) -> Result<()> {
        tracing::debug!("Visiting {}", url);
        self.renderer.navigate(url).await?;
        self.wait_for(self.state.landing_condition()).await?;

        let current = self.renderer.current_url().await?;
        if current.starts_with(&self.login_host) {
            tracing::info!("Redirected to login at {}", current);
            self.log_in().await?;
        }
        Ok(())
    }

    /// Fills in and submits the two-step login form
    pub async fn log_in(&mut self) -> Result<()> {
        let username = self.credentials.username.clone();
        let password = self.credentials.password.clone();

        self.submit_field(Condition::LoginUsername, &username).await?;
        self.submit_field(Condition::LoginPassword, &password).await?;
        self.wait_for(Condition::LoginComplete).await?;

        self.state = AuthState::Authenticated;
        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    /// The rendered markup of the page the session is on
    pub async fn markup(&mut self) -> Result<String> {
        self.renderer.current_markup().await
    }

    async fn submit_field(&mut self, field: Condition, value: &str) -> Result<()> {
        self.wait_for(field).await?;
        // the login widget drops keystrokes until its transition finishes
        tokio::time::sleep(self.settle_delay).await;
        let selector = field.selector(&self.selectors).to_string();
        self.renderer.type_text(&selector, value).await?;

        self.wait_for(Condition::LoginContinue).await?;
        let button = Condition::LoginContinue.selector(&self.selectors).to_string();
        self.renderer.click(&button).await
    }

    async fn wait_for(&mut self, condition: Condition) -> Result<()> {
        let selector = condition.selector(&self.selectors);
        self.renderer.wait_for_visible(selector, self.timeout).await
    }
}
