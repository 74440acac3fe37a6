//! Verification Cache (C8): deterministic SHA-256 cache keyed by
//! (normalized-claim, window, providers, sources-hash).

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::types::{Evidence, TimeWindow, VerificationRecord};

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and collapse whitespace in claim text for deterministic keying.
pub fn normalize_claim_text(text: &str) -> String {
    collapse_whitespace(text).to_ascii_lowercase()
}

/// SHA-256 hex digest over the sorted, `"|"`-joined tuples
/// `(id, url, publisher, snippet, published_at?)` of `evidence` (§4.C8).
/// Returns the `"no-sources"` sentinel when empty.
pub fn compute_sources_hash(evidence: &[Evidence]) -> String {
    if evidence.is_empty() {
        return "no-sources".to_string();
    }
    let mut sorted: Vec<&Evidence> = evidence.iter().collect();
    sorted.sort_by_key(|e| e.id);

    let joined = sorted
        .iter()
        .map(|e| {
            format!(
                "{}|{}|{}|{}|{}",
                e.id,
                e.url,
                e.publisher,
                e.snippet,
                e.published_at.map(|t| t.to_rfc3339()).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("|");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the deterministic cache key (§4.C8): SHA-256 over
/// `normalized_text | window_token | providers_token | sources_hash`.
pub fn build_cache_key(
    claim_text: &str,
    window: &TimeWindow,
    providers: &[String],
    evidence: &[Evidence],
) -> String {
    let normalized_text = normalize_claim_text(claim_text);
    let window_token = window.cache_token();
    let mut sorted_providers = providers.to_vec();
    sorted_providers.sort();
    let providers_token = sorted_providers.join("|");
    let sources_hash = compute_sources_hash(evidence);

    let payload = format!("{normalized_text}|{window_token}|{providers_token}|{sources_hash}");
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-process verification cache. Read and write both deep-copy (the stored
/// value is owned independently of the caller's copy).
#[derive(Default)]
pub struct VerificationCache {
    entries: Mutex<HashMap<String, VerificationRecord>>,
}

impl VerificationCache {
    /// Construct an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by key, returning an owned clone.
    pub fn get(&self, key: &str) -> Option<VerificationRecord> {
        self.entries.lock().get(key).cloned()
    }

    /// Insert or replace the record at `key`.
    pub fn put(&self, key: String, record: VerificationRecord) {
        self.entries.lock().insert(key, record);
    }

    /// Remove every cached record. Used by tests.
    pub fn reset(&self) {
        self.entries.lock().clear();
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache currently holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
