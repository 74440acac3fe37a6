//! Error types for the provider adapter layer.

use thiserror::Error;

/// Error type for provider adapter operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// An adapter was constructed or invoked without a required API key.
    #[error("provider configuration error: {0}")]
    Config(String),

    /// The provider returned a response with no usable content.
    #[error("provider returned an empty or malformed response: {0}")]
    EmptyResponse(String),

    /// An HTTP transport error talking to a provider.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// An error from the OpenAI-compatible client (used for OpenAI and xAI).
    #[error(transparent)]
    OpenAi(#[from] async_openai::error::OpenAIError),

    /// Generic wrapped error from a dependency.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for provider adapter operations.
pub type Result<T> = std::result::Result<T, Error>;
