// src/notifier/mod.rs

//! Alert delivery.
//!
//! The run loop only depends on the [`Notifier`] trait; the X client is one
//! implementation, and [`DryRunNotifier`] stands in for it under `--dry-run`
//! and in tests. Delivery failures are logged by the caller and never roll
//! back state: by the time an alert is posted, its snapshot update has
//! already happened.

pub mod x_api;

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

pub use x_api::{Credentials, XNotifier};

/// Hard length limit for a posted status, in grapheme clusters.
pub const MAX_STATUS_GRAPHEMES: usize = 280;

const TRUNCATION_MARKER: &str = "…";

/// Delivers a single alert message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
}

/// Logs alerts instead of posting them.
pub struct DryRunNotifier;

#[async_trait]
impl Notifier for DryRunNotifier {
    async fn post(&self, text: &str) -> Result<()> {
        log::info!("[dry-run] would post: {}", truncate_status(text));
        Ok(())
    }
}

/// Truncate `text` to the status limit, marking the cut tail with `…`.
pub fn truncate_status(text: &str) -> String {
    let count = text.graphemes(true).count();
    if count <= MAX_STATUS_GRAPHEMES {
        return text.to_string();
    }
    let mut truncated: String = text
        .graphemes(true)
        .take(MAX_STATUS_GRAPHEMES - TRUNCATION_MARKER.chars().count())
        .collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_status_untouched() {
        assert_eq!(truncate_status("oferta"), "oferta");
    }

    #[test]
    fn test_exact_limit_untouched() {
        let text = "a".repeat(280);
        assert_eq!(truncate_status(&text), text);
    }

    #[test]
    fn test_over_limit_truncates_with_marker() {
        let text = "a".repeat(300);
        let truncated = truncate_status(&text);
        assert_eq!(truncated.chars().count(), 280);
        assert!(truncated.ends_with('…'));
        assert!(truncated.starts_with("aaa"));
    }

    #[test]
    fn test_truncation_respects_graphemes() {
        // Combining-character clusters must not be split in half.
        let text = "ñ".repeat(300);
        let truncated = truncate_status(&text);
        assert_eq!(truncated.graphemes(true).count(), 280);
        assert!(truncated.ends_with('…'));
    }
}
