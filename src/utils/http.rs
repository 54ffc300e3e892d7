// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use rand::Rng;

use crate::error::Result;
use crate::models::WatcherConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &WatcherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page and return its body text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let text = client.get(url).send().await?.text().await?;
    Ok(text)
}

/// Sleep for a randomized interval between outbound requests.
///
/// A politeness measure against rate limiting and blocks; the jitter range
/// comes from `[watcher] delay_min_ms`/`delay_max_ms`.
pub async fn polite_delay(config: &WatcherConfig) {
    if config.delay_max_ms == 0 {
        return;
    }
    let ms = rand::thread_rng().gen_range(config.delay_min_ms..=config.delay_max_ms);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
