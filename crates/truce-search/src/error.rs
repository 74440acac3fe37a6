//! Error types for the search/fetch toolset and explorer agent.

use thiserror::Error;

/// Error type for `truce-search` operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A URL failed SSRF validation and will not be fetched.
    #[error("refusing to fetch: {0}")]
    SsrfBlocked(String),

    /// The underlying HTTP client failed.
    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Generic wrapped error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for `truce-search` operations.
pub type Result<T> = std::result::Result<T, Error>;
