//! The `truce.panel.v1` normalized prompt payload (§4.C6) and the evidence
//! lookup table passed alongside it to every adapter.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use truce_core::types::Claim;
use uuid::Uuid;

/// The schema tag every normalized prompt payload carries.
pub const PROMPT_SCHEMA: &str = "truce.panel.v1";

fn sort_by_published_at_asc_null_last(claim: &Claim) -> Vec<&truce_core::types::Evidence> {
    let mut evidence: Vec<&truce_core::types::Evidence> = claim.evidence.iter().collect();
    evidence.sort_by(|a, b| match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    evidence
}

/// Build the normalized `truce.panel.v1` payload from `claim`'s current
/// evidence, sorted by `published_at` ascending with nulls last (§4.C6).
pub fn build_prompt(claim: &Claim, time_window: &truce_core::types::TimeWindow) -> Value {
    let evidence = sort_by_published_at_asc_null_last(claim);
    let evidence_json: Vec<Value> = evidence
        .iter()
        .map(|e| {
            json!({
                "id": e.id,
                "publisher": e.publisher,
                "snippet": e.snippet,
                "url": e.url,
                "published_at": e.published_at,
            })
        })
        .collect();

    json!({
        "schema": PROMPT_SCHEMA,
        "claim": {
            "id": claim.id,
            "text": claim.text,
            "topic": claim.topic,
            "entities": claim.entities,
        },
        "time_window": { "start": time_window.start, "end": time_window.end },
        "evidence": evidence_json,
        "evidence_count": evidence_json.len(),
        "generated_at": Utc::now(),
    })
}

/// Build the `{ string(evidence.id) -> evidence.id }` lookup passed to
/// adapters alongside the prompt, restricted to evidence in `claim` (§4.C6).
pub fn build_evidence_lookup(claim: &Claim) -> HashMap<String, Uuid> {
    claim.evidence.iter().map(|e| (e.id.to_string(), e.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use truce_core::types::{Evidence, TimeWindow};

    fn claim_with_evidence() -> Claim {
        let mut claim = Claim::new("A claim with enough characters here", "a topic", vec![]).unwrap();
        let recent = Evidence::new("https://example.com/a", "pub", None, "recent snippet", Some(Utc::now()), "test").unwrap();
        let undated = Evidence::new("https://example.com/b", "pub", None, "undated snippet", None, "test").unwrap();
        claim.add_evidence(undated);
        claim.add_evidence(recent);
        claim
    }

    #[test]
    fn prompt_carries_schema_tag() {
        let claim = claim_with_evidence();
        let prompt = build_prompt(&claim, &TimeWindow::default());
        assert_eq!(prompt["schema"], PROMPT_SCHEMA);
        assert_eq!(prompt["evidence_count"], 2);
    }

    #[test]
    fn evidence_sorted_with_nulls_last() {
        let claim = claim_with_evidence();
        let prompt = build_prompt(&claim, &TimeWindow::default());
        let evidence = prompt["evidence"].as_array().unwrap();
        assert!(!evidence[0]["published_at"].is_null());
        assert!(evidence[1]["published_at"].is_null());
    }

    #[test]
    fn evidence_lookup_maps_string_ids_to_uuids() {
        let claim = claim_with_evidence();
        let lookup = build_evidence_lookup(&claim);
        for evidence in &claim.evidence {
            assert_eq!(lookup[&evidence.id.to_string()], evidence.id);
        }
    }
}
