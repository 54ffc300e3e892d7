// src/services/pccomponentes.rs

//! PcComponentes deals scraper.
//!
//! Single-page scrape of the ofertas listing; every product card carries
//! title, price and stock state inline.

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Item, WatcherConfig};
use crate::utils::http;
use crate::utils::price::parse_price_eur;
use crate::utils::{last_path_segment, resolve_url, strip_query};

use super::parse_selector;

pub const SITE_ID: &str = "pccomponentes";

const BASE_URL: &str = "https://www.pccomponentes.com";
const DEALS_URL: &str = "https://www.pccomponentes.com/ofertas";

/// Cards read from the listing per run.
const MAX_CARDS: usize = 60;

pub struct PcComponentesScraper {
    watcher: WatcherConfig,
}

impl PcComponentesScraper {
    pub fn new(watcher: WatcherConfig) -> Self {
        Self { watcher }
    }
}

#[async_trait]
impl super::SiteScraper for PcComponentesScraper {
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

/// Parse the ofertas listing into items.
fn parse_deals(html: &str) -> Result<Vec<Item>> {
    let document = Html::parse_document(html);
    let card_sel = parse_selector("div.producto, div.box-producto")?;
    let link_sel = parse_selector("a[href]")?;
    let price_sel = parse_selector(".precio, .precio-main, .product-price")?;
    let sold_out_sel = parse_selector(".agotado")?;
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

        let price = card
            .select(&price_sel)
            .next()
            .and_then(|tag| parse_price_eur(&tag.text().collect::<String>()));

        let card_text: String = card.text().collect();
        let in_stock = card.select(&sold_out_sel).next().is_none()
            && !card_text.to_lowercase().contains("sin stock");

        let Some(product_id) = last_path_segment(&url) else {
            continue;
        };

        items.push(Item {
            site_id: SITE_ID.to_string(),
            product_id,
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
              <div class="producto">
                <a href="/ssd-kingston-nv3-1tb?promo=1" title="SSD Kingston NV3 1TB">SSD</a>
                <span class="precio">54,99 €</span>
              </div>
              <div class="box-producto">
                <a href="/monitor-lg-27">Monitor LG 27"</a>
                <span class="product-price">129,00€</span>
                <span class="agotado">Agotado</span>
              </div>
            </body></html>
        "#;

        let items = parse_deals(html).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].product_id, "ssd-kingston-nv3-1tb");
        assert_eq!(items[0].title.as_deref(), Some("SSD Kingston NV3 1TB"));
        assert_eq!(items[0].price, Some(54.99));
        assert!(items[0].in_stock);
        assert_eq!(
            items[0].url,
            "https://www.pccomponentes.com/ssd-kingston-nv3-1tb"
        );

        assert_eq!(items[1].product_id, "monitor-lg-27");
        assert_eq!(items[1].title.as_deref(), Some("Monitor LG 27\""));
        assert!(!items[1].in_stock);
    }

    #[test]
    fn test_parse_deals_sin_stock_text_marker() {
        let html = r#"
            <div class="producto">
              <a href="/grafica-rtx">Gráfica RTX</a>
              <div>Sin stock temporalmente</div>
            </div>
        "#;

        let items = parse_deals(html).unwrap();
        assert_eq!(items.len(), 1);
        assert!(!items[0].in_stock);
        assert_eq!(items[0].price, None);
    }

    #[test]
    fn test_parse_deals_skips_cards_without_links() {
        let html = r#"<div class="producto"><span class="precio">9,99 €</span></div>"#;
        let items = parse_deals(html).unwrap();
        assert!(items.is_empty());
    }
}
