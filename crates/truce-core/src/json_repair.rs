//! Tolerant JSON parsing for adversarially malformed provider responses (§4.C5).
//!
//! Kept as a standalone pure function (no I/O, no provider knowledge) so its
//! tolerance policy can be tested in isolation (§9 DESIGN NOTES).

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());
static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").unwrap());
static BLOCK_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());
static REPEATED_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*,+").unwrap());
static STRING_ADJACENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*\n?\s*""#).unwrap());
static OBJECT_ADJACENCY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\s*\{").unwrap());
static ARRAY_ADJACENCY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\]\s*\[").unwrap());
static LITERAL_BEFORE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(true|false|null|-?\d+(?:\.\d+)?)\s*\n?\s*(")"#).unwrap());
static OUTER_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Apply the JSON-repair rules in the order given by §4.C5.
pub fn repair(text: &str) -> String {
    let mut s = text.to_string();
    s = LINE_COMMENT.replace_all(&s, "").to_string();
    s = BLOCK_COMMENT.replace_all(&s, "").to_string();
    s = TRAILING_COMMA.replace_all(&s, "$1").to_string();
    s = REPEATED_COMMA.replace_all(&s, ",").to_string();
    s = STRING_ADJACENCY.replace_all(&s, "\",\"").to_string();
    s = OBJECT_ADJACENCY.replace_all(&s, "},{").to_string();
    s = ARRAY_ADJACENCY.replace_all(&s, "],[").to_string();
    s = LITERAL_BEFORE_KEY.replace_all(&s, "$1,$2").to_string();
    s.trim().to_string()
}

/// Strip a single surrounding markdown code fence, if present.
fn strip_fence(text: &str) -> String {
    if let Some(caps) = FENCE.captures(text.trim()) {
        caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_else(|| text.to_string())
    } else {
        text.to_string()
    }
}

/// Parse `raw` into a JSON object, tolerating the deviations listed in §4.C5 /
/// §6: markdown fences, trailing prose, comments, missing commas. Returns
/// [`Error::UnparseablePayload`] only once every fallback has been exhausted.
pub fn ensure_payload_dict(raw: &str) -> Result<serde_json::Value> {
    let unfenced = strip_fence(raw);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(unfenced.trim()) {
        if value.is_object() {
            return Ok(value);
        }
    }

    let repaired = repair(&unfenced);
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&repaired) {
        if value.is_object() {
            return Ok(value);
        }
    }

    if let Some(m) = OUTER_OBJECT.find(&unfenced) {
        let block = repair(m.as_str());
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&block) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    Err(Error::UnparseablePayload(format!(
        "unable to extract a JSON object from provider response ({} bytes)",
        raw.len()
    )))
}
