use crate::config::types::{
    Config, CrawlerConfig, Credentials, OutputConfig, SelectorConfig, SiteConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_credentials(&config.credentials)?;
    validate_crawler_config(&config.crawler)?;
    validate_selectors(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must use HTTPS scheme",
            config.base_url
        )));
    }

    if base.fragment().is_some() {
        return Err(ConfigError::Validation(format!(
            "base-url '{}' must not carry a fragment",
            config.base_url
        )));
    }

    Url::parse(&config.login_host)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid login-host: {}", e)))?;

    Ok(())
}

fn validate_credentials(credentials: &Credentials) -> Result<(), ConfigError> {
    if credentials.username.is_empty() {
        return Err(ConfigError::Validation(
            "username cannot be empty (set it in [credentials] or HUDDLE_USERNAME)".to_string(),
        ));
    }

    if credentials.password.is_empty() {
        return Err(ConfigError::Validation(
            "password cannot be empty (set it in [credentials] or HUDDLE_PASSWORD)".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.selector_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "selector-timeout-ms must be >= 100ms, got {}ms",
            config.selector_timeout_ms
        )));
    }

    Ok(())
}

fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let fields = [
        ("header", &config.header),
        ("app-ready", &config.app_ready),
        ("username-field", &config.username_field),
        ("password-field", &config.password_field),
        ("continue-button", &config.continue_button),
        ("login-complete", &config.login_complete),
        ("folder-row", &config.folder_row),
        ("file-row", &config.file_row),
    ];

    for (field, selector) in fields {
        if selector.trim().is_empty() || Selector::parse(selector).is_err() {
            return Err(ConfigError::InvalidSelector {
                field: field.to_string(),
                selector: selector.to_string(),
            });
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            site: SiteConfig {
                base_url: "https://my.huddle.net/".to_string(),
                login_host: "https://login.huddle.net".to_string(),
            },
            credentials: Credentials {
                username: "user".to_string(),
                password: "pass".to_string(),
            },
            crawler: CrawlerConfig::default(),
            selectors: SelectorConfig::default(),
            output: OutputConfig {
                database_path: "./huddle.db".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_http_base_url() {
        let mut config = valid_config();
        config.site.base_url = "http://my.huddle.net/".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = valid_config();
        config.site.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_base_url_with_fragment() {
        let mut config = valid_config();
        config.site.base_url = "https://my.huddle.net/#/folder/root/list".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_password() {
        let mut config = valid_config();
        config.credentials.password.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_rejects_tiny_selector_timeout() {
        let mut config = valid_config();
        config.crawler.selector_timeout_ms = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_selector() {
        let mut config = valid_config();
        config.selectors.folder_row = "a[[".to_string();
        match validate(&config) {
            Err(ConfigError::InvalidSelector { field, .. }) => assert_eq!(field, "folder-row"),
            other => panic!("expected InvalidSelector, got {:?}", other),
        }
    }
}
