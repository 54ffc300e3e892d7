// src/engine/mod.rs

//! The state-diff and alerting decision engine.

mod decide;

pub use decide::{Decision, evaluate};
