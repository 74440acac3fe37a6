//! Stub payload synthesis (§4.C5): the deterministic fallback used whenever a
//! provider call fails non-fatally (missing key, transport error) rather than
//! producing a garbled payload the repairer can't save.

use std::collections::HashMap;

use truce_core::direction::{infer_direction, infer_evidence_direction, Direction};
use truce_core::types::{ArgumentWithEvidence, Claim, PanelModelVerdict};

use async_trait::async_trait;
use uuid::Uuid;

use crate::client::PanelAdapter;

/// Default per-adapter baseline confidence mixed into the directional anchor
/// (§4.C5: "neither -> provider base").
pub const DEFAULT_BASE_CONFIDENCE: f64 = 0.5;

/// OpenAI's stub baseline leans slightly toward approval.
pub const OPENAI_BASE_CONFIDENCE: f64 = 0.6;
/// xAI's stub baseline leans slightly toward refusal.
pub const XAI_BASE_CONFIDENCE: f64 = 0.4;
/// Gemini's stub baseline is unbiased.
pub const GEMINI_BASE_CONFIDENCE: f64 = 0.5;
/// Anthropic's stub baseline leans slightly toward refusal.
pub const ANTHROPIC_BASE_CONFIDENCE: f64 = 0.45;

/// The stub baseline confidence associated with a known provider id, falling
/// back to [`DEFAULT_BASE_CONFIDENCE`] for anything else (§4.C5: "openai ->
/// optimistic, xai -> skeptical, google -> mixed").
pub fn base_confidence_for_provider(provider_id: &str) -> f64 {
    match provider_id {
        "openai" => OPENAI_BASE_CONFIDENCE,
        "xai" => XAI_BASE_CONFIDENCE,
        "gemini" | "google" => GEMINI_BASE_CONFIDENCE,
        "anthropic" => ANTHROPIC_BASE_CONFIDENCE,
        _ => DEFAULT_BASE_CONFIDENCE,
    }
}

/// Maximum number of evidence ids attached to each side of a stub payload.
const STUB_EVIDENCE_LIMIT: usize = 3;

fn anchor(claim_direction: Option<Direction>, evidence_direction: Option<Direction>, base: f64) -> f64 {
    match (claim_direction, evidence_direction) {
        (Some(c), Some(e)) if c == e => 0.8,
        (Some(_), Some(_)) => 0.2,
        (Some(Direction::Up), None) => 0.2,
        (Some(Direction::Down), None) => 0.8,
        _ => base,
    }
}

/// Build a dual-sided verdict from directional lexical inference rather than
/// a model call, attaching the claim's first evidence items to both sides.
pub fn generate_stub_payload(
    provider_id: &str,
    model_name: &str,
    claim: &Claim,
    base_confidence: f64,
) -> PanelModelVerdict {
    let claim_direction = infer_direction(&claim.text);
    let evidence_direction =
        infer_evidence_direction(claim.evidence.iter().map(|e| e.snippet.as_str()));

    let lean = 0.7 * anchor(claim_direction, evidence_direction, base_confidence) + 0.3 * base_confidence;
    let approval_confidence = lean.clamp(0.05, 0.95);
    let refusal_confidence = 1.0 - approval_confidence;

    let evidence_ids: Vec<Uuid> =
        claim.evidence.iter().take(STUB_EVIDENCE_LIMIT).map(|e| e.id).collect();

    let approval_argument = truce_core::argument::normalize_argument_length(
        "No parseable verdict was returned by the provider. This stub argument for the \
         claim as stated is synthesized from directional lexical cues in the gathered \
         evidence rather than a model assessment.",
        50,
        2000,
    );
    let refusal_argument = truce_core::argument::normalize_argument_length(
        "No parseable verdict was returned by the provider. This stub argument against \
         the claim as stated is synthesized from directional lexical cues in the gathered \
         evidence rather than a model assessment.",
        50,
        2000,
    );

    PanelModelVerdict {
        provider_id: provider_id.to_string(),
        model_name: model_name.to_string(),
        approval_argument: ArgumentWithEvidence {
            argument: approval_argument,
            evidence_ids: evidence_ids.clone(),
            citations: Vec::new(),
            confidence: approval_confidence,
        },
        refusal_argument: ArgumentWithEvidence {
            argument: refusal_argument,
            evidence_ids,
            citations: Vec::new(),
            confidence: refusal_confidence,
        },
        raw_payload: serde_json::Value::Null,
        failed: false,
        error: None,
    }
}

/// A [`PanelAdapter`] that always produces a stub payload, never calling out
/// to a model. Used when no credentials are configured and in tests (§9
/// DESIGN NOTES: "Ship a null adapter").
pub struct StubAdapter {
    provider_id: String,
    model_name: String,
    base_confidence: f64,
}

impl StubAdapter {
    /// Construct a stub adapter with the default baseline confidence.
    pub fn new(provider_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        let provider_id = provider_id.into();
        let base_confidence = base_confidence_for_provider(&provider_id);
        Self { provider_id, model_name: model_name.into(), base_confidence }
    }

    /// Override the baseline confidence mixed into the directional anchor.
    pub fn with_base_confidence(mut self, base_confidence: f64) -> Self {
        self.base_confidence = base_confidence;
        self
    }
}

#[async_trait]
impl PanelAdapter for StubAdapter {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn evaluate(
        &self,
        claim: &Claim,
        _prompt: &serde_json::Value,
        _evidence_lookup: &HashMap<String, Uuid>,
    ) -> PanelModelVerdict {
        generate_stub_payload(&self.provider_id, &self.model_name, claim, self.base_confidence)
    }
}
