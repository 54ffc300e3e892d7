// src/services/fnac.rs

//! Fnac España deals scraper.
//!
//! Fnac cards expose no product id, so items are keyed by a digest of the
//! canonical URL.

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

pub const SITE_ID: &str = "fnac";

const BASE_URL: &str = "https://www.fnac.es";
const DEALS_URL: &str = "https://www.fnac.es/Ofertas";

const MAX_CARDS: usize = 50;

pub struct FnacScraper {
    watcher: WatcherConfig,
}

impl FnacScraper {
    pub fn new(watcher: WatcherConfig) -> Self {
        Self { watcher }
    }
}

#[async_trait]
impl super::SiteScraper for FnacScraper {
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
    let card_sel = parse_selector(".Article-item")?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deals() {
        let html = r#"
            <html><body>
              <div class="Article-item">
                <a href="/auriculares-sony?origin=home" title="Auriculares Sony">Auriculares</a>
                <p>Antes 99,99 € ahora 79,99 €</p>
              </div>
              <div class="Article-item">
                <a href="/ebook-kobo">Ebook Kobo</a>
                <p>Producto agotado</p>
              </div>
            </body></html>
        "#;

        let items = parse_deals(html).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title.as_deref(), Some("Auriculares Sony"));
        // First euro amount in the card wins.
        assert_eq!(items[0].price, Some(99.99));
        assert!(items[0].in_stock);
        assert_eq!(items[0].url, "https://www.fnac.es/auriculares-sony");
        assert_eq!(items[0].product_id, url_id("https://www.fnac.es/auriculares-sony"));

        assert!(!items[1].in_stock);
        assert_eq!(items[1].price, None);
    }

    #[test]
    fn test_product_id_ignores_tracking_params() {
        let with_params = r#"
            <div class="Article-item"><a href="/juego-switch?tracking=abc">Juego</a></div>
        "#;
        let without_params = r#"
            <div class="Article-item"><a href="/juego-switch">Juego</a></div>
        "#;

        let a = parse_deals(with_params).unwrap();
        let b = parse_deals(without_params).unwrap();
        assert_eq!(a[0].product_id, b[0].product_id);
    }
}
