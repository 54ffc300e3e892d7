// src/engine/decide.rs

//! Pure decision logic: one scraped item plus its previous snapshot in,
//! zero or more alerts plus the replacement snapshot out.
//!
//! The engine performs no I/O. The run loop owns the side effects (posting
//! alerts, updating the store), which keeps state tracking and alerting
//! decoupled: the snapshot is always replaced, whether or not anything
//! fired.

use chrono::{DateTime, Utc};

use crate::models::{Alert, AlertReason, Item, ItemKey, Snapshot, render_message};

/// Outcome of evaluating a single item.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Triggered alerts, price rule first. At most one per reason.
    pub alerts: Vec<Alert>,
    /// Replacement snapshot for the item's key, computed unconditionally.
    pub snapshot: Snapshot,
}

/// Evaluate both alert rules for `item` against its previous snapshot.
///
/// Price-drop rule: fires iff the item has a price, the site has a
/// threshold, the price is at or below the threshold, and the price is a
/// strict improvement over the previously recorded one. An absent previous
/// snapshot (or a previous snapshot without a price) counts as an
/// infinitely high prior price, so a product first seen below the threshold
/// alerts immediately, while a price sitting flat at the same
/// below-threshold value does not re-alert every run.
///
/// Back-in-stock rule: fires iff the item is in stock now and the previous
/// snapshot recorded it as out of stock. A first sighting never fires this
/// rule; there is no transition to report.
///
/// Each triggered reason emits its own alert, so an item that crosses the
/// price threshold while coming back in stock produces two alerts rather
/// than one reason silently overriding the other.
pub fn evaluate(
    item: &Item,
    key: &ItemKey,
    previous: Option<&Snapshot>,
    price_threshold: Option<f64>,
    template: &str,
    now: DateTime<Utc>,
) -> Decision {
    let mut alerts = Vec::new();

    if let (Some(price), Some(threshold)) = (item.price, price_threshold) {
        let improved = match previous.and_then(|prev| prev.price) {
            Some(prev_price) => prev_price > price,
            None => true,
        };
        if price <= threshold && improved {
            alerts.push(Alert {
                key: key.clone(),
                reason: AlertReason::PriceBelowThreshold,
                message: render_message(template, item),
            });
        }
    }

    if item.in_stock && previous.is_some_and(|prev| !prev.in_stock) {
        alerts.push(Alert {
            key: key.clone(),
            reason: AlertReason::BackInStock,
            message: render_message(template, item),
        });
    }

    Decision {
        alerts,
        snapshot: Snapshot::observe(item, now),
    }
}
