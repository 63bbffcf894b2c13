//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Source website and HTTP behavior settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Durable store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Notification settings
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(AppError::validation("source.base_url is empty"));
        }
        url::Url::parse(&self.source.base_url)
            .map_err(|e| AppError::validation(format!("source.base_url is not a URL: {e}")))?;
        if !self.source.list_path.starts_with('/') {
            return Err(AppError::validation("source.list_path must start with '/'"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        if self.source.max_concurrent == 0 {
            return Err(AppError::validation("source.max_concurrent must be > 0"));
        }
        if self.store.path.trim().is_empty() {
            return Err(AppError::validation("store.path is empty"));
        }
        if self.notify.template.trim().is_empty() {
            return Err(AppError::validation("notify.template is empty"));
        }
        if self.notify.max_length == 0 {
            return Err(AppError::validation("notify.max_length must be > 0"));
        }
        match self.notify.publisher.as_str() {
            "stdout" => {}
            "http" => {
                if self.notify.endpoint.trim().is_empty() {
                    return Err(AppError::validation(
                        "notify.endpoint is required for the http publisher",
                    ));
                }
            }
            other => {
                return Err(AppError::validation(format!(
                    "notify.publisher must be 'stdout' or 'http', got '{other}'"
                )));
            }
        }
        Ok(())
    }
}

/// Source website and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the regulator's website
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the enforcement action list page
    #[serde(default = "defaults::list_path")]
    pub list_path: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent page fetches
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl SourceConfig {
    /// Full URL of the enforcement action list page.
    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.list_path)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            list_path: defaults::list_path(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Durable store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store file path, relative to the data directory
    #[serde(default = "defaults::store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::store_path(),
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Publisher kind: "stdout" or "http"
    #[serde(default = "defaults::publisher")]
    pub publisher: String,

    /// Status endpoint for the http publisher
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token for the http publisher.
    /// Overridden by the ICOWATCH_ACCESS_TOKEN environment variable.
    #[serde(default)]
    pub access_token: String,

    /// Post text template, see EnforcementRecord::format for placeholders
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Maximum post length in grapheme clusters
    #[serde(default = "defaults::max_length")]
    pub max_length: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            publisher: defaults::publisher(),
            endpoint: String::new(),
            access_token: String::new(),
            template: defaults::template(),
            max_length: defaults::max_length(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn base_url() -> String {
        "https://ico.org.uk".into()
    }
    pub fn list_path() -> String {
        "/action-weve-taken/enforcement/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; icowatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        250
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Store defaults
    pub fn store_path() -> String {
        "records.json".into()
    }

    // Notify defaults
    pub fn publisher() -> String {
        "stdout".into()
    }
    pub fn template() -> String {
        "New ICO {kind}: {organisation} ({date}) {link}".into()
    }
    pub fn max_length() -> usize {
        500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.source.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.source.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_http_publisher_without_endpoint() {
        let mut config = Config::default();
        config.notify.publisher = "http".to_string();
        assert!(config.validate().is_err());

        config.notify.endpoint = "https://example.social/api/v1/statuses".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_publisher() {
        let mut config = Config::default();
        config.notify.publisher = "carrier-pigeon".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn list_url_joins_without_double_slash() {
        let mut source = SourceConfig::default();
        source.base_url = "https://ico.org.uk/".to_string();
        assert_eq!(
            source.list_url(),
            "https://ico.org.uk/action-weve-taken/enforcement/"
        );
    }
}
