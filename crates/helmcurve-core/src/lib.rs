//! helmcurve-core: Difficulty scoring and agent-characteristic fitting.
//!
//! This crate defines the response data model, the per-task correctness
//! evaluators, and the difficulty / accuracy statistics that the rest of
//! helmcurve builds on. Everything here is pure and synchronous: callers load
//! the data and hand it in.

pub mod accuracy;
pub mod characteristic;
pub mod difficulty;
pub mod discretize;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod report;

pub use error::{CoreError, Result};
