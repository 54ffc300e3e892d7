// src/services/mediamarkt.rs

//! MediaMarkt España deals scraper.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Item, WatcherConfig};
use crate::utils::http;
use crate::utils::price::parse_price_eur;
use crate::utils::{resolve_url, strip_query};

use super::{parse_selector, url_id};

pub const SITE_ID: &str = "mediamarkt";

const BASE_URL: &str = "https://www.mediamarkt.es";
const DEALS_URL: &str = "https://www.mediamarkt.es/ofertas";

const MAX_CARDS: usize = 60;

pub struct MediaMarktScraper {
    watcher: WatcherConfig,
}

impl MediaMarktScraper {
    pub fn new(watcher: WatcherConfig) -> Self {
        Self { watcher }
    }
}

#[async_trait]
impl super::SiteScraper for MediaMarktScraper {
    fn site_id(&self) -> &'static str {
        SITE_ID
    }

    async fn scrape(&self, client: &Client) -> Result<Vec<Item>> {
        http::polite_delay(&self.watcher).await;
        let html = http::fetch_text(client, DEALS_URL)
            .await
            .map_err(|e| AppError::scrape(SITE_ID, e))?;
        parse_deals(&html)
    }
}

fn parse_deals(html: &str) -> Result<Vec<Item>> {
    let document = Html::parse_document(html);
    let card_sel = parse_selector(".product-pod, .product")?;
    let link_sel = parse_selector("a[href]")?;
    let base = Url::parse(BASE_URL)?;

    let mut items = Vec::new();
    for card in document.select(&card_sel).take(MAX_CARDS) {
        let Some(anchor) = card.select(&link_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = strip_query(&resolve_url(&base, href));

        let title = anchor
            .value()
            .attr("title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| {
                let text = anchor.text().collect::<String>().trim().to_string();
                (!text.is_empty()).then_some(text)
            });

        let card_text: String = card.text().collect();
        let price = parse_price_eur(&card_text);
        let in_stock = !card_text.to_lowercase().contains("agotado");

        items.push(Item {
            site_id: SITE_ID.to_string(),
            product_id: url_id(&url),
            title,
            price,
            in_stock,
            url,
        });
    }

    Ok(items)
}
