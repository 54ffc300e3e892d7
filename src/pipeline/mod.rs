// src/pipeline/mod.rs

//! Pipeline entry points for watcher operations.
//!
//! - `run_watch`: one batch pass (scrape, diff, alert, persist)
//! - `run_validate`: configuration check

pub mod validate;
pub mod watch;

pub use validate::run_validate;
pub use watch::{RunSummary, run_watch};
