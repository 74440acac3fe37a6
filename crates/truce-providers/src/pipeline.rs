//! The shared post-processing pipeline every adapter runs around its single
//! HTTP round trip (§4.C5 steps 2-5): tolerant JSON parsing, argument
//! extraction and normalization, citation extraction, and failure
//! classification. A transport/config failure from the provider call itself
//! is non-fatal and synthesizes a stub payload; a payload that survives the
//! call but can't be parsed into a JSON object even after repair is always
//! fatal and is recorded as a failed verdict.

use std::collections::HashMap;

use serde_json::Value;
use truce_core::argument::{clamp_confidence, normalize_argument_length};
use truce_core::citations::extract_citations;
use truce_core::json_repair::ensure_payload_dict;
use truce_core::types::{ArgumentWithEvidence, Claim, PanelModelVerdict};
use uuid::Uuid;

use crate::client::ProviderClient;
use crate::prompt::system_prompt;
use crate::stub::generate_stub_payload;

fn failed_verdict(provider_id: &str, model_name: &str, reason: &str) -> PanelModelVerdict {
    PanelModelVerdict {
        provider_id: provider_id.to_string(),
        model_name: model_name.to_string(),
        approval_argument: ArgumentWithEvidence::placeholder(reason),
        refusal_argument: ArgumentWithEvidence::placeholder(reason),
        raw_payload: Value::Null,
        failed: true,
        error: Some(reason.to_string()),
    }
}

fn extract_side(
    value: &Value,
    key: &str,
    evidence_lookup: &HashMap<String, Uuid>,
) -> Option<ArgumentWithEvidence> {
    let side = value.get(key)?;
    let raw_argument = side.get("argument")?.as_str()?;
    let raw_confidence = side.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);

    let mut evidence_ids: Vec<Uuid> = Vec::new();
    if let Some(ids) = side.get("evidence_ids").and_then(Value::as_array) {
        for id in ids {
            if let Some(id_str) = id.as_str() {
                if let Some(&uuid) = evidence_lookup.get(id_str) {
                    if !evidence_ids.contains(&uuid) {
                        evidence_ids.push(uuid);
                    }
                }
            }
        }
    }

    let (citations, cleaned) = extract_citations(raw_argument, evidence_lookup);
    let argument = normalize_argument_length(&cleaned, 50, 2000);

    Some(ArgumentWithEvidence {
        argument,
        evidence_ids,
        citations,
        confidence: clamp_confidence(raw_confidence),
    })
}

/// Run the full §4.C5 pipeline for one provider/model against `claim` and the
/// normalized `prompt` payload, never propagating an error: transport
/// failures, missing keys, and unparseable prose all resolve to either a stub
/// payload or an explicit `failed=true` verdict.
pub async fn evaluate<C: ProviderClient>(
    provider_id: &str,
    model_name: &str,
    claim: &Claim,
    prompt: &Value,
    evidence_lookup: &HashMap<String, Uuid>,
    client: &C,
) -> PanelModelVerdict {
    let system_prompt = system_prompt();
    let user_payload = serde_json::to_string(prompt).unwrap_or_default();

    let raw = match client.invoke(&system_prompt, &user_payload).await {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(provider_id, model_name, error = %err, "provider invocation failed, falling back to stub payload");
            return generate_stub_payload(provider_id, model_name, claim, crate::stub::base_confidence_for_provider(provider_id));
        }
    };

    let value = match ensure_payload_dict(&raw) {
        Ok(value) => value,
        Err(err) => {
            let message = err.to_string();
            tracing::warn!(provider_id, model_name, error = %message, "provider payload unparseable, recording failure");
            return failed_verdict(provider_id, model_name, &message);
        }
    };

    let approval_argument = extract_side(&value, "approval_argument", evidence_lookup);
    let refusal_argument = extract_side(&value, "refusal_argument", evidence_lookup);

    let (Some(approval_argument), Some(refusal_argument)) = (approval_argument, refusal_argument) else {
        tracing::warn!(provider_id, model_name, "provider payload missing an argument key, falling back to stub payload");
        return generate_stub_payload(provider_id, model_name, claim, crate::stub::DEFAULT_BASE_CONFIDENCE);
    };

    PanelModelVerdict {
        provider_id: provider_id.to_string(),
        model_name: model_name.to_string(),
        approval_argument,
        refusal_argument,
        raw_payload: value,
        failed: false,
        error: None,
    }
}
