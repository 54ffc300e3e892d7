// src/pipeline/validate.rs

//! Configuration check command.

use std::path::Path;

use crate::error::Result;
use crate::models::Config;

/// Load and validate the configuration, logging a short summary.
pub fn run_validate(config_path: &Path) -> Result<Config> {
    let config = Config::load(config_path)?;

    log::info!("Configuration OK: {}", config_path.display());
    log::info!(
        "  sites: {} defined, {} enabled",
        config.sites.len(),
        config.enabled_sites().count()
    );
    for site in &config.sites {
        let threshold = site
            .price_threshold_eur
            .map(|t| format!("{t:.2}€"))
            .unwrap_or_else(|| "none".to_string());
        log::info!(
            "  - {} ({}) enabled={} threshold={}",
            site.id,
            site.name,
            site.enabled,
            threshold
        );
    }
    log::info!("  template: {}", config.alerts.template);
    match config.alerts.retention_days {
        Some(days) => log::info!("  retention: {days} days"),
        None => log::info!("  retention: unlimited"),
    }

    Ok(config)
}
