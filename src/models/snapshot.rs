// src/models/snapshot.rs

//! Last-persisted state for a tracked product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The most recent observation persisted for a tracked product.
///
/// Exactly one snapshot is kept per key; every run replaces it with the
/// current observation, whether or not an alert fired.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// Last observed price in EUR (absent if it was unparseable)
    pub price: Option<f64>,

    /// Last observed availability
    pub in_stock: bool,

    /// Timestamp of the last observation
    pub last_seen: DateTime<Utc>,
}

impl Snapshot {
    /// Snapshot of the current observation of `item` at `now`.
    pub fn observe(item: &crate::models::Item, now: DateTime<Utc>) -> Self {
        Self {
            price: item.price,
            in_stock: item.in_stock,
            last_seen: now,
        }
    }
}
