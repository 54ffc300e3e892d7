// src/models/alert.rs

//! Alert decisions and message rendering.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Item, ItemKey};

/// Maximum title length in alert text, in grapheme clusters.
const MAX_TITLE_GRAPHEMES: usize = 200;

/// Placeholder title for items whose page carried none.
const UNTITLED: &str = "(sin título)";

/// Why an alert fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    PriceBelowThreshold,
    BackInStock,
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::PriceBelowThreshold => write!(f, "price_below_threshold"),
            AlertReason::BackInStock => write!(f, "back_in_stock"),
        }
    }
}

/// A decision to notify, with its reason and rendered message text.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub key: ItemKey,
    pub reason: AlertReason,
    pub message: String,
}

/// Render the alert message for `item` using the configured template.
///
/// Supported placeholders: `{title}`, `{price}`, `{url}`. The title is
/// truncated to 200 graphemes; an absent title renders as `(sin título)`
/// and an absent price as `?` (reachable for back-in-stock alerts), so the
/// template always renders.
pub fn render_message(template: &str, item: &Item) -> String {
    let title = match &item.title {
        Some(t) => truncate_graphemes(t, MAX_TITLE_GRAPHEMES),
        None => UNTITLED.to_string(),
    };
    let price = match item.price {
        Some(p) => format!("{p:.2}"),
        None => "?".to_string(),
    };
    template
        .replace("{title}", &title)
        .replace("{price}", &price)
        .replace("{url}", &item.url)
}

/// Truncate a string to at most `max` grapheme clusters.
fn truncate_graphemes(s: &str, max: usize) -> String {
    s.graphemes(true).take(max).collect()
}
