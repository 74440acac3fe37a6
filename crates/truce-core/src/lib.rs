//! Core data model, aggregation, caching, and session-progress machinery for
//! the truce claim adjudication engine.
//!
//! This crate has no knowledge of search providers or LLM providers; it is
//! the shared substrate that `truce-search`, `truce-research`,
//! `truce-providers`, and `truce-panel` build on.

pub mod aggregate;
pub mod api;
pub mod argument;
pub mod cache;
pub mod citations;
pub mod claim_registry;
pub mod direction;
pub mod error;
pub mod json_repair;
pub mod normalize;
pub mod progress;
pub mod types;

pub use error::{Error, Result};
