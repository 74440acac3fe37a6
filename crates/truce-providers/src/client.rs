//! The two trait seams of the adapter layer: [`ProviderClient`] (the part
//! that differs per vendor — one HTTP round trip) and [`PanelAdapter`] (the
//! object-safe, vendor-erased interface the panel orchestrator holds).

use std::collections::HashMap;

use async_trait::async_trait;
use truce_core::types::{Claim, PanelModelVerdict};
use uuid::Uuid;

use crate::error::Result;

/// Sampling temperature used for every provider invocation (§4.C5).
pub const EVALUATION_TEMPERATURE: f32 = 0.1;
/// Maximum tokens requested per provider invocation (§4.C5).
pub const EVALUATION_MAX_TOKENS: u32 = 2000;

/// A single vendor's chat invocation: system prompt + serialized user payload
/// in, raw response text out. Never returns an error for a non-2xx or
/// malformed-JSON response — only for failures to even complete the HTTP
/// exchange (timeouts, connection errors, missing credentials).
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Invoke the model once and return its raw response text, unparsed.
    async fn invoke(&self, system_prompt: &str, user_payload: &str) -> Result<String>;
}

/// The panel orchestrator's view of one model: evaluate a claim against a
/// normalized prompt payload, producing a dual-sided verdict (§4.C5/§4.C6).
#[async_trait]
pub trait PanelAdapter: Send + Sync {
    /// `provider:model`, e.g. `"openai:gpt-4o"`.
    fn provider_id(&self) -> &str;
    /// Bare model name, e.g. `"gpt-4o"`.
    fn model_name(&self) -> &str;
    /// Run the full evaluation pipeline against `prompt` (the `truce.panel.v1`
    /// payload built by C6), resolving citation markers via `evidence_lookup`.
    async fn evaluate(
        &self,
        claim: &Claim,
        prompt: &serde_json::Value,
        evidence_lookup: &HashMap<String, Uuid>,
    ) -> PanelModelVerdict;
}

/// Wraps a concrete [`ProviderClient`] with the provider/model identity and
/// runs the shared evaluation pipeline (§4.C5 steps 2-5) around its single
/// HTTP round trip.
pub struct ModelAdapter<C> {
    provider_id: String,
    model_name: String,
    client: C,
}

impl<C: ProviderClient> ModelAdapter<C> {
    /// Construct an adapter for `provider_id`/`model_name` backed by `client`.
    pub fn new(provider_id: impl Into<String>, model_name: impl Into<String>, client: C) -> Self {
        Self { provider_id: provider_id.into(), model_name: model_name.into(), client }
    }
}

#[async_trait]
impl<C: ProviderClient> PanelAdapter for ModelAdapter<C> {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn evaluate(
        &self,
        claim: &Claim,
        prompt: &serde_json::Value,
        evidence_lookup: &HashMap<String, Uuid>,
    ) -> PanelModelVerdict {
        crate::pipeline::evaluate(&self.provider_id, &self.model_name, claim, prompt, evidence_lookup, &self.client)
            .await
    }
}
