// src/storage/mod.rs

//! Durable snapshot persistence.
//!
//! The state file is a single human-readable JSON document mapping rendered
//! `site_id|product_id` keys to snapshots:
//!
//! ```text
//! {
//!   "amazon_es|B0ABCDEF12": {
//!     "price": 119.99,
//!     "in_stock": true,
//!     "last_seen": "2026-08-07T06:00:00Z"
//!   }
//! }
//! ```
//!
//! It is loaded once at startup, mutated in memory while the run processes
//! items, and rewritten in full by a single `save()` at the end of the run.
//! A crash before `save()` loses that run's observations but never leaves a
//! partially written file behind.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{ItemKey, Snapshot};

/// In-memory snapshot map bound to a state file on disk.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    data: HashMap<ItemKey, Snapshot>,
}

impl StateStore {
    /// Load the store from `path`.
    ///
    /// An absent, unreadable or corrupt state file resets the store to
    /// empty with a warning; loading never fails the run.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, Snapshot>>(&bytes) {
                Ok(map) => {
                    let mut data = HashMap::with_capacity(map.len());
                    for (raw, snapshot) in map {
                        match ItemKey::parse(&raw) {
                            Some(key) => {
                                data.insert(key, snapshot);
                            }
                            None => {
                                log::warn!("Dropping malformed state key '{raw}'");
                            }
                        }
                    }
                    data
                }
                Err(e) => {
                    log::warn!(
                        "State file {} is corrupt ({e}), starting from empty state",
                        path.display()
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!(
                    "Cannot read state file {} ({e}), starting from empty state",
                    path.display()
                );
                HashMap::new()
            }
        };

        Self { path, data }
    }

    /// Look up the previous snapshot for a key.
    pub fn get(&self, key: &ItemKey) -> Option<&Snapshot> {
        self.data.get(key)
    }

    /// Upsert a snapshot in memory. Durable only after `save()`.
    pub fn set(&mut self, key: ItemKey, snapshot: Snapshot) {
        self.data.insert(key, snapshot);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Oldest and newest `last_seen` across all snapshots.
    pub fn last_seen_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut iter = self.data.values().map(|s| s.last_seen);
        let first = iter.next()?;
        let (mut oldest, mut newest) = (first, first);
        for ts in iter {
            oldest = oldest.min(ts);
            newest = newest.max(ts);
        }
        Some((oldest, newest))
    }

    /// Drop snapshots last seen before `cutoff`. Returns how many were
    /// removed. Sites rotate their catalogs, so without this the store
    /// grows without bound.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.data.len();
        self.data.retain(|_, snapshot| snapshot.last_seen >= cutoff);
        before - self.data.len()
    }

    /// Atomically persist the full map (write to a temp file, then rename),
    /// creating parent directories as needed.
    pub async fn save(&self) -> Result<()> {
        let rendered: BTreeMap<String, &Snapshot> = self
            .data
            .iter()
            .map(|(key, snapshot)| (key.to_string(), snapshot))
            .collect();
        let bytes = serde_json::to_vec_pretty(&rendered)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
