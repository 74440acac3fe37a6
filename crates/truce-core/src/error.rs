//! Error types for the truce core crate.

use thiserror::Error;

/// Error type for core adjudication-engine operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A claim's `text` or `topic` failed length validation.
    #[error("claim validation failed: {0}")]
    InvalidClaim(String),

    /// An evidence snippet or argument failed length validation.
    #[error("evidence validation failed: {0}")]
    InvalidEvidence(String),

    /// `time_start` was after `time_end`.
    #[error("time window inverted: start {start} is after end {end}")]
    InvertedTimeWindow {
        /// Requested start timestamp (RFC 3339).
        start: String,
        /// Requested end timestamp (RFC 3339).
        end: String,
    },

    /// A verification was requested for an unknown claim.
    #[error("claim {0} not found")]
    ClaimNotFound(String),

    /// A progress-bus operation referenced an unknown session.
    #[error("session {0} not found")]
    SessionNotFound(String),

    /// A session was cancelled while a pipeline stage was executing.
    #[error("session {0} was cancelled")]
    Cancelled(String),

    /// A provider payload could not be parsed even after repair.
    #[error("could not parse provider payload: {0}")]
    UnparseablePayload(String),

    /// Generic wrapped error from a dependency.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for core adjudication-engine operations.
pub type Result<T> = std::result::Result<T, Error>;
