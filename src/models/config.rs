// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Alert message and retention settings
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Watched site definitions
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Unlike scrape or delivery failures, an unreadable or invalid
    /// configuration aborts the run before any scraping (startup-fatal).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::config(format!(
                "cannot read config file {:?}: {e}",
                path.as_ref()
            ))
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.watcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("watcher.user_agent is empty"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::validation("watcher.timeout_secs must be > 0"));
        }
        if self.watcher.delay_min_ms > self.watcher.delay_max_ms {
            return Err(AppError::validation(
                "watcher.delay_min_ms must be <= watcher.delay_max_ms",
            ));
        }
        if self.alerts.template.trim().is_empty() {
            return Err(AppError::validation("alerts.template is empty"));
        }
        let mut seen = std::collections::HashSet::new();
        for site in &self.sites {
            if site.id.trim().is_empty() {
                return Err(AppError::validation("site with empty id"));
            }
            if site.id.contains('|') {
                // '|' separates site and product in persisted state keys.
                return Err(AppError::validation(format!(
                    "site id '{}' must not contain '|'",
                    site.id
                )));
            }
            if !seen.insert(site.id.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate site id '{}'",
                    site.id
                )));
            }
            if let Some(threshold) = site.price_threshold_eur {
                if threshold < 0.0 {
                    return Err(AppError::validation(format!(
                        "site '{}' has negative price_threshold_eur",
                        site.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sites that are switched on for this run.
    pub fn enabled_sites(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.iter().filter(|s| s.enabled)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watcher: WatcherConfig::default(),
            alerts: AlertConfig::default(),
            sites: Vec::new(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Lower bound of the randomized delay between requests, in milliseconds
    #[serde(default = "defaults::delay_min")]
    pub delay_min_ms: u64,

    /// Upper bound of the randomized delay between requests, in milliseconds
    #[serde(default = "defaults::delay_max")]
    pub delay_max_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            delay_min_ms: defaults::delay_min(),
            delay_max_ms: defaults::delay_max(),
        }
    }
}

/// Alert message template and snapshot retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Message template with `{title}`, `{price}` and `{url}` placeholders
    #[serde(default = "defaults::template")]
    pub template: String,

    /// Drop snapshots unseen for this many days (absent = keep forever)
    #[serde(default)]
    pub retention_days: Option<u32>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            template: defaults::template(),
            retention_days: None,
        }
    }
}

/// One watched site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Stable site identifier, used for scraper dispatch and state keys
    pub id: String,

    /// Display name for logging
    pub name: String,

    /// Whether this site is scraped at all
    #[serde(default)]
    pub enabled: bool,

    /// Price-drop alert threshold in EUR (absent disables the price rule)
    #[serde(default)]
    pub price_threshold_eur: Option<f64>,
}

/// Default configuration values.
mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
            .to_string()
    }

    pub fn timeout() -> u64 {
        15
    }

    pub fn delay_min() -> u64 {
        500
    }

    pub fn delay_max() -> u64 {
        1200
    }

    pub fn template() -> String {
        "{title} — {price}€ {url}".to_string()
    }
}
