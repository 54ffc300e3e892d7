// src/services/mod.rs

//! Site scraper adapters.
//!
//! Each adapter fetches one site's deals page(s) and produces normalized
//! [`Item`]s. Adapters are brittle against markup changes on purpose: the
//! fetch side is thin, and the HTML heuristics live in plain parse
//! functions that take the page source, so they stay testable without a
//! network.

pub mod amazon;
pub mod fnac;
pub mod mediamarkt;
pub mod pccomponentes;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Selector;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::{Item, SiteConfig, WatcherConfig};

/// A site-specific scraper producing normalized items.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    /// Stable site identifier the produced items are tagged with.
    fn site_id(&self) -> &'static str;

    /// Fetch and normalize the site's current deal listings.
    async fn scrape(&self, client: &Client) -> Result<Vec<Item>>;
}

/// Look up the scraper registered for a configured site.
///
/// Returns `None` for unknown site ids; the run loop logs and moves on, so
/// a typo in the config never aborts the run.
pub fn for_site(site: &SiteConfig, watcher: &WatcherConfig) -> Option<Box<dyn SiteScraper>> {
    match site.id.as_str() {
        amazon::SITE_ID => Some(Box::new(amazon::AmazonEsScraper::new(watcher.clone()))),
        pccomponentes::SITE_ID => {
            Some(Box::new(pccomponentes::PcComponentesScraper::new(watcher.clone())))
        }
        fnac::SITE_ID => Some(Box::new(fnac::FnacScraper::new(watcher.clone()))),
        mediamarkt::SITE_ID => Some(Box::new(mediamarkt::MediaMarktScraper::new(watcher.clone()))),
        _ => None,
    }
}

/// Parse a CSS selector, mapping failures to a structured error.
pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::selector(selector, e))
}

/// Compact stable product id derived from a canonical URL.
///
/// Used by sites whose listings expose no natural product identifier; the
/// query string must already be stripped so the id survives tracking-param
/// churn between runs.
pub(crate) fn url_id(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    hex::encode(&digest[..6])
}
