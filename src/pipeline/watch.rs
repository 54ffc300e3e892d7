// src/pipeline/watch.rs

//! The batch run: scrape enabled sites, diff against the snapshot store,
//! dispatch alerts, persist.
//!
//! Error containment follows scope: a failing site skips that site, a
//! malformed item skips that item, a failed alert post skips that alert.
//! Nothing below a startup failure unwinds past this loop. Alerts are
//! dispatched only after every site has been processed and every snapshot
//! updated, and the store is saved exactly once at the end, so a crash
//! mid-run can lose a run's observations but never persist half of one.

use chrono::{DateTime, Duration, Utc};

use crate::engine;
use crate::models::{Alert, Config, SiteConfig};
use crate::notifier::Notifier;
use crate::services::{self, SiteScraper};
use crate::storage::StateStore;

/// Counters for one batch pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sites_scraped: usize,
    pub sites_failed: usize,
    pub items_seen: usize,
    pub items_skipped: usize,
    pub alerts_posted: usize,
    pub alerts_failed: usize,
    pub pruned: usize,
    pub state_saved: bool,
}

/// Run one complete watch pass.
pub async fn run_watch(
    config: &Config,
    store: &mut StateStore,
    notifier: &dyn Notifier,
    client: &reqwest::Client,
) -> RunSummary {
    let resolved: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = config
        .enabled_sites()
        .map(|site| (site, services::for_site(site, &config.watcher)))
        .collect();

    if resolved.is_empty() {
        log::warn!("No sites enabled in configuration, nothing to do");
        return RunSummary::default();
    }

    run_resolved(config, resolved, store, notifier, client, Utc::now()).await
}

async fn run_resolved(
    config: &Config,
    sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)>,
    store: &mut StateStore,
    notifier: &dyn Notifier,
    client: &reqwest::Client,
    now: DateTime<Utc>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut alerts: Vec<Alert> = Vec::new();

    for (site, scraper) in sites {
        let Some(scraper) = scraper else {
            log::warn!("No scraper registered for site '{}'", site.id);
            summary.sites_failed += 1;
            continue;
        };

        log::info!("Scraping {}", site.name);
        let items = match scraper.scrape(client).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Scrape failed for {}: {e}", site.id);
                summary.sites_failed += 1;
                continue;
            }
        };
        summary.sites_scraped += 1;
        log::info!("{}: {} items", site.id, items.len());

        for item in &items {
            summary.items_seen += 1;
            let key = match item.key() {
                Ok(key) => key,
                Err(e) => {
                    log::warn!("Skipping item: {e}");
                    summary.items_skipped += 1;
                    continue;
                }
            };

            let decision = engine::evaluate(
                item,
                &key,
                store.get(&key),
                site.price_threshold_eur,
                &config.alerts.template,
                now,
            );
            alerts.extend(decision.alerts);
            // The snapshot is replaced whether or not anything fired.
            store.set(key, decision.snapshot);
        }
    }

    for alert in &alerts {
        log::info!("Alerting {} — {}", alert.key, alert.reason);
        match notifier.post(&alert.message).await {
            Ok(()) => summary.alerts_posted += 1,
            Err(e) => {
                log::error!("Failed to post alert for {}: {e}", alert.key);
                summary.alerts_failed += 1;
            }
        }
    }

    if let Some(days) = config.alerts.retention_days {
        let cutoff = now - Duration::days(i64::from(days));
        summary.pruned = store.prune(cutoff);
        if summary.pruned > 0 {
            log::info!("Pruned {} snapshots unseen since {cutoff}", summary.pruned);
        }
    }

    match store.save().await {
        Ok(()) => summary.state_saved = true,
        // Alerts were already dispatched; losing this run's observations
        // must not fail the process.
        Err(e) => log::error!("Failed to persist state: {e}"),
    }

    log::info!(
        "Run complete. Sites: {} ok / {} failed, items: {}, alerts posted: {}",
        summary.sites_scraped,
        summary.sites_failed,
        summary.items_seen,
        summary.alerts_posted
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use crate::error::{AppError, Result};
    use crate::models::{Item, ItemKey};

    struct StaticScraper {
        items: Vec<Item>,
    }

    #[async_trait]
    impl SiteScraper for StaticScraper {
        fn site_id(&self) -> &'static str {
            "static"
        }

        async fn scrape(&self, _client: &reqwest::Client) -> Result<Vec<Item>> {
            Ok(self.items.clone())
        }
    }

    struct FailingScraper;

    #[async_trait]
    impl SiteScraper for FailingScraper {
        fn site_id(&self) -> &'static str {
            "failing"
        }

        async fn scrape(&self, _client: &reqwest::Client) -> Result<Vec<Item>> {
            Err(AppError::scrape("failing", "connection reset"))
        }
    }

    /// Records posted messages; optionally refuses them.
    #[derive(Default)]
    struct RecordingNotifier {
        posted: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn post(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(AppError::notify("delivery refused"));
            }
            self.posted.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn site(id: &str, threshold: Option<f64>) -> SiteConfig {
        SiteConfig {
            id: id.to_string(),
            name: id.to_string(),
            enabled: true,
            price_threshold_eur: threshold,
        }
    }

    fn item(product_id: &str, price: Option<f64>, in_stock: bool) -> Item {
        Item {
            site_id: "shop".to_string(),
            product_id: product_id.to_string(),
            title: Some(format!("Producto {product_id}")),
            price,
            in_stock,
            url: format!("https://shop.example/{product_id}"),
        }
    }

    async fn store_in(tmp: &TempDir) -> StateStore {
        StateStore::load(tmp.path().join("state.json")).await
    }

    #[tokio::test]
    async fn test_no_enabled_sites_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier::default();
        let config = Config::default();

        let summary = run_watch(&config, &mut store, &notifier, &reqwest::Client::new()).await;

        assert_eq!(summary, RunSummary::default());
        assert!(notifier.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_site_does_not_abort_the_run() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier::default();
        let config = Config::default();

        let s1 = site("shop", Some(100.0));
        let s2 = site("broken", None);
        let sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = vec![
            (&s2, Some(Box::new(FailingScraper))),
            (
                &s1,
                Some(Box::new(StaticScraper {
                    items: vec![item("X1", Some(50.0), true)],
                })),
            ),
        ];

        let summary = run_resolved(
            &config,
            sites,
            &mut store,
            &notifier,
            &reqwest::Client::new(),
            Utc::now(),
        )
        .await;

        assert_eq!(summary.sites_failed, 1);
        assert_eq!(summary.sites_scraped, 1);
        assert_eq!(summary.alerts_posted, 1);
        assert!(summary.state_saved);
        assert!(store.get(&ItemKey::new("shop", "X1")).is_some());
    }

    #[tokio::test]
    async fn test_unknown_site_id_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier::default();
        let config = Config::default();

        let s = site("aliexpress", None);
        let sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = vec![(&s, None)];

        let summary = run_resolved(
            &config,
            sites,
            &mut store,
            &notifier,
            &reqwest::Client::new(),
            Utc::now(),
        )
        .await;

        assert_eq!(summary.sites_failed, 1);
        assert_eq!(summary.items_seen, 0);
        assert!(summary.state_saved);
    }

    #[tokio::test]
    async fn test_malformed_items_are_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier::default();
        let config = Config::default();

        let s = site("shop", Some(100.0));
        let sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = vec![(
            &s,
            Some(Box::new(StaticScraper {
                items: vec![item("", Some(10.0), true), item("X1", Some(10.0), true)],
            })),
        )];

        let summary = run_resolved(
            &config,
            sites,
            &mut store,
            &notifier,
            &reqwest::Client::new(),
            Utc::now(),
        )
        .await;

        assert_eq!(summary.items_seen, 2);
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.alerts_posted, 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_still_updates_state() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let config = Config::default();

        let s = site("shop", Some(100.0));
        let sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = vec![(
            &s,
            Some(Box::new(StaticScraper {
                items: vec![item("X1", Some(50.0), true)],
            })),
        )];

        let summary = run_resolved(
            &config,
            sites,
            &mut store,
            &notifier,
            &reqwest::Client::new(),
            Utc::now(),
        )
        .await;

        assert_eq!(summary.alerts_failed, 1);
        assert_eq!(summary.alerts_posted, 0);
        assert!(summary.state_saved);
        // The snapshot converged, so the next identical run stays silent.
        assert_eq!(
            store.get(&ItemKey::new("shop", "X1")).unwrap().price,
            Some(50.0)
        );
    }

    #[tokio::test]
    async fn test_second_identical_run_posts_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier::default();
        let config = Config::default();

        let s = site("shop", Some(100.0));
        let items = vec![item("X1", Some(50.0), true), item("X2", None, true)];

        for pass in 0..2 {
            let sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = vec![(
                &s,
                Some(Box::new(StaticScraper {
                    items: items.clone(),
                })),
            )];
            let summary = run_resolved(
                &config,
                sites,
                &mut store,
                &notifier,
                &reqwest::Client::new(),
                Utc::now(),
            )
            .await;

            if pass == 0 {
                assert_eq!(summary.alerts_posted, 1);
            } else {
                assert_eq!(summary.alerts_posted, 0);
            }
        }

        assert_eq!(notifier.posted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retention_prunes_stale_snapshots() {
        let tmp = TempDir::new().unwrap();
        let mut store = store_in(&tmp).await;
        let notifier = RecordingNotifier::default();

        let mut config = Config::default();
        config.alerts.retention_days = Some(30);

        store.set(
            ItemKey::new("shop", "stale"),
            crate::models::Snapshot {
                price: None,
                in_stock: true,
                last_seen: Utc::now() - Duration::days(90),
            },
        );

        let s = site("shop", None);
        let sites: Vec<(&SiteConfig, Option<Box<dyn SiteScraper>>)> = vec![(
            &s,
            Some(Box::new(StaticScraper {
                items: vec![item("fresh", None, true)],
            })),
        )];

        let summary = run_resolved(
            &config,
            sites,
            &mut store,
            &notifier,
            &reqwest::Client::new(),
            Utc::now(),
        )
        .await;

        assert_eq!(summary.pruned, 1);
        assert!(store.get(&ItemKey::new("shop", "stale")).is_none());
        assert!(store.get(&ItemKey::new("shop", "fresh")).is_some());
    }
}
