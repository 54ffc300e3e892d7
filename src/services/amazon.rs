// src/services/amazon.rs

//! Amazon España deals scraper.
//!
//! Walks the goldbox deals page for product links, then fetches each
//! product page for title, price and availability. Product pages come in
//! several price layouts, so extraction tries the known price block ids
//! before falling back to a euro-amount scan over the page.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Item, WatcherConfig};
use crate::utils::http;
use crate::utils::price::{parse_price, parse_price_eur};
use crate::utils::strip_query;

use super::parse_selector;

pub const SITE_ID: &str = "amazon_es";

const BASE_URL: &str = "https://www.amazon.es";
const DEALS_URL: &str = "https://www.amazon.es/gp/goldbox";

/// Product page fetches per run.
const MAX_PRODUCTS: usize = 30;

/// Price block ids seen across product page layouts.
const PRICE_BLOCK_IDS: [&str; 3] = [
    "priceblock_ourprice",
    "priceblock_dealprice",
    "priceblock_saleprice",
];

static ASIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})").unwrap());

static OUT_OF_STOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Actualmente no disponible|Sin stock|Agotado").unwrap());

pub struct AmazonEsScraper {
    watcher: WatcherConfig,
}

impl AmazonEsScraper {
    pub fn new(watcher: WatcherConfig) -> Self {
        Self { watcher }
    }
}

#[async_trait]
impl super::SiteScraper for AmazonEsScraper {
    fn site_id(&self) -> &'static str {
        SITE_ID
    }

    async fn scrape(&self, client: &Client) -> Result<Vec<Item>> {
        http::polite_delay(&self.watcher).await;
        let html = http::fetch_text(client, DEALS_URL)
            .await
            .map_err(|e| AppError::scrape(SITE_ID, e))?;

        let links = extract_deal_links(&html)?;
        let mut items = Vec::new();

        for (asin, url) in links {
            if items.len() >= MAX_PRODUCTS {
                break;
            }
            http::polite_delay(&self.watcher).await;
            match http::fetch_text(client, &url).await {
                Ok(page) => {
                    if let Some(item) = parse_product_page(&page, &asin, &url) {
                        items.push(item);
                    }
                }
                Err(e) => {
                    log::debug!("{SITE_ID}: product fetch failed for {url}: {e}");
                }
            }
        }

        Ok(items)
    }
}

/// Collect (ASIN, canonical product URL) pairs from the deals page.
fn extract_deal_links(html: &str) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(html);
    let anchor_sel = parse_selector("a[href]")?;
    let base = Url::parse(BASE_URL)?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(caps) = ASIN_RE.captures(href) else {
            continue;
        };
        let asin = caps[1].to_string();
        if !seen.insert(asin.clone()) {
            continue;
        }
        let url = strip_query(&crate::utils::resolve_url(&base, href));
        links.push((asin, url));
    }

    Ok(links)
}

/// Parse one product page into an item, or `None` when the page is not
/// usable (parse errors here are expected churn, not run failures).
fn parse_product_page(html: &str, asin: &str, url: &str) -> Option<Item> {
    let document = Html::parse_document(html);

    let title_sel = parse_selector("#productTitle").ok()?;
    let title = document
        .select(&title_sel)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            let head_title = parse_selector("title").ok()?;
            document
                .select(&head_title)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        });

    let mut price = None;
    for id in PRICE_BLOCK_IDS {
        let sel = parse_selector(&format!("#{id}")).ok()?;
        if let Some(block) = document.select(&sel).next() {
            price = parse_price(&block.text().collect::<String>());
            break;
        }
    }
    if price.is_none() {
        price = parse_price_eur(html);
    }

    let page_text: String = document.root_element().text().collect();
    let in_stock = !OUT_OF_STOCK_RE.is_match(&page_text);

    Some(Item {
        site_id: SITE_ID.to_string(),
        product_id: asin.to_string(),
        title,
        price,
        in_stock,
        url: url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_deal_links_dedupes_asins() {
        let html = r#"
            <html><body>
              <a href="/dp/B0AAAA1111?ref=deal">Oferta</a>
              <a href="https://www.amazon.es/gp/product/B0BBBB2222">Otra</a>
              <a href="/dp/B0AAAA1111/ref=twister">Duplicada</a>
              <a href="/help/contact">Ayuda</a>
            </body></html>
        "#;

        let links = extract_deal_links(html).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].0, "B0AAAA1111");
        assert_eq!(links[0].1, "https://www.amazon.es/dp/B0AAAA1111");
        assert_eq!(links[1].0, "B0BBBB2222");
    }

    #[test]
    fn test_parse_product_page_price_block() {
        let html = r#"
            <html><body>
              <span id="productTitle"> Ratón inalámbrico </span>
              <span id="priceblock_dealprice">24,99 €</span>
            </body></html>
        "#;

        let item =
            parse_product_page(html, "B0AAAA1111", "https://www.amazon.es/dp/B0AAAA1111").unwrap();
        assert_eq!(item.title.as_deref(), Some("Ratón inalámbrico"));
        assert_eq!(item.price, Some(24.99));
        assert!(item.in_stock);
        assert_eq!(item.product_id, "B0AAAA1111");
    }

    #[test]
    fn test_parse_product_page_fallback_price_and_title() {
        let html = r#"
            <html><head><title>Teclado mecánico</title></head>
            <body><div>Precio: 59,90 € con envío</div></body></html>
        "#;

        let item =
            parse_product_page(html, "B0CCCC3333", "https://www.amazon.es/dp/B0CCCC3333").unwrap();
        assert_eq!(item.title.as_deref(), Some("Teclado mecánico"));
        assert_eq!(item.price, Some(59.90));
    }

    #[test]
    fn test_parse_product_page_out_of_stock() {
        let html = r#"
            <html><body>
              <span id="productTitle">Consola</span>
              <div id="availability">Actualmente no disponible.</div>
            </body></html>
        "#;

        let item =
            parse_product_page(html, "B0DDDD4444", "https://www.amazon.es/dp/B0DDDD4444").unwrap();
        assert!(!item.in_stock);
        assert_eq!(item.price, None);
    }
}
