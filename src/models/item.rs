// src/models/item.rs

//! Product observation data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One normalized product observation from a single scrape pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Identifier of the originating site (stable across runs)
    pub site_id: String,

    /// Site-scoped product identifier (stable across runs)
    pub product_id: String,

    /// Display title (absent when the page carries none)
    pub title: Option<String>,

    /// Price in EUR (absent when unparseable)
    pub price: Option<f64>,

    /// Availability flag
    pub in_stock: bool,

    /// Canonical product URL
    pub url: String,
}

impl Item {
    /// Build the tracking key for this item.
    ///
    /// Fails on an empty `site_id` or `product_id`; such items cannot be
    /// tracked across runs and are skipped by the run loop.
    pub fn key(&self) -> Result<ItemKey> {
        if self.site_id.trim().is_empty() {
            return Err(AppError::validation("item has empty site_id"));
        }
        if self.product_id.trim().is_empty() {
            return Err(AppError::validation(format!(
                "item from {} has empty product_id ({})",
                self.site_id, self.url
            )));
        }
        Ok(ItemKey {
            site_id: self.site_id.clone(),
            product_id: self.product_id.clone(),
        })
    }
}

/// Stable composite identifier of a tracked product.
///
/// Structured rather than a concatenated string, so product ids containing
/// the separator cannot collide in memory. The persisted state file renders
/// keys as `site_id|product_id`; config validation rejects `|` in site ids,
/// which keeps `split_once('|')` unambiguous when reading the file back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub site_id: String,
    pub product_id: String,
}

impl ItemKey {
    pub fn new(site_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            product_id: product_id.into(),
        }
    }

    /// Parse a rendered `site_id|product_id` key from the state file.
    pub fn parse(s: &str) -> Option<Self> {
        let (site_id, product_id) = s.split_once('|')?;
        if site_id.is_empty() || product_id.is_empty() {
            return None;
        }
        Some(Self::new(site_id, product_id))
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.site_id, self.product_id)
    }
}
