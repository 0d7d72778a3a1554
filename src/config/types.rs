use serde::Deserialize;

/// Main configuration structure for Huddle-Mapper
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub credentials: Credentials,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the site; listing URLs are `<base-url>#/folder/<id>/list`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Prefix of the identity provider's login pages
    #[serde(rename = "login-host", default = "default_login_host")]
    pub login_host: String,
}

/// Login credentials
///
/// `HUDDLE_USERNAME` and `HUDDLE_PASSWORD` override these when set.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Pause after every live fetch (milliseconds)
    #[serde(rename = "fetch-delay-ms", default)]
    pub fetch_delay_ms: u64,

    /// Ignore cached markup and fetch every listing again
    #[serde(rename = "force-refetch", default)]
    pub force_refetch: bool,

    /// Pause before typing into a login field (milliseconds)
    #[serde(rename = "login-settle-ms", default = "default_login_settle_ms")]
    pub login_settle_ms: u64,

    /// How long to wait for any selector to become visible (milliseconds)
    #[serde(rename = "selector-timeout-ms", default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 0,
            force_refetch: false,
            login_settle_ms: default_login_settle_ms(),
            selector_timeout_ms: default_selector_timeout_ms(),
            headless: default_headless(),
        }
    }
}

/// CSS selectors for the markers, login form and listing rows
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Header present on both the login page and the app
    #[serde(rename = "header")]
    pub header: String,

    /// In-app element present only after login
    #[serde(rename = "app-ready")]
    pub app_ready: String,

    #[serde(rename = "username-field")]
    pub username_field: String,

    #[serde(rename = "password-field")]
    pub password_field: String,

    #[serde(rename = "continue-button")]
    pub continue_button: String,

    /// Search widget that signals a finished login
    #[serde(rename = "login-complete")]
    pub login_complete: String,

    /// Anchor of each folder row in a listing
    #[serde(rename = "folder-row")]
    pub folder_row: String,

    /// Anchor of each file row in a listing
    #[serde(rename = "file-row")]
    pub file_row: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            header: r#"[data-part="header"]"#.to_string(),
            app_ready: "#list-search".to_string(),
            username_field: "input#userIdentifierField".to_string(),
            password_field: "input#passwordField".to_string(),
            continue_button: r#"[data-automation="continue-button"]"#.to_string(),
            login_complete: "#list-search".to_string(),
            folder_row: ".files-list__item--folder a.files-list__label".to_string(),
            file_row: ".files-list__item--file a.files-list__label".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database backing the store
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_login_host() -> String {
    "https://login.huddle.net".to_string()
}

fn default_login_settle_ms() -> u64 {
    500
}

fn default_selector_timeout_ms() -> u64 {
    30_000
}

fn default_headless() -> bool {
    true
}
