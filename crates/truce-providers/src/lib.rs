//! Provider Adapter Layer (C5) for the truce claim adjudication engine: one
//! [`client::ProviderClient`] per vendor's HTTP round trip, wrapped by the
//! shared [`pipeline::evaluate`] post-processing pipeline into a vendor-erased
//! [`client::PanelAdapter`] the panel orchestrator holds.

pub mod anthropic;
pub mod client;
pub mod env;
pub mod error;
pub mod gemini;
pub mod openai_compatible;
pub mod pipeline;
pub mod prompt;
pub mod stub;

pub use anthropic::{anthropic_adapter, AnthropicClient};
pub use client::{ModelAdapter, PanelAdapter, ProviderClient};
pub use error::{Error, Result};
pub use gemini::{gemini_adapter, GeminiClient};
pub use openai_compatible::{openai_adapter, xai_adapter, OpenAiCompatibleClient};
pub use stub::StubAdapter;
