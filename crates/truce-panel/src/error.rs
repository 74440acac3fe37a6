//! Error type for the panel orchestrator crate.

use thiserror::Error;

/// Error type for panel-orchestrator operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Propagated from the core data model (e.g. an inverted time window).
    #[error(transparent)]
    Core(#[from] truce_core::Error),
}

/// Result type for panel-orchestrator operations.
pub type Result<T> = std::result::Result<T, Error>;
