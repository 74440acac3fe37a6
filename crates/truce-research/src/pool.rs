//! Shared Evidence Pool (C4): collects evidence from all researchers in a
//! panel run, deduplicated by URL hash, thread-safe for concurrent additions.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dashmap::DashSet;
use parking_lot::Mutex;
use truce_core::types::Evidence;

fn url_hash(url: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    hasher.finish()
}

/// Holds evidence gathered by all researchers during one panel run.
/// Deduplication here is strictly by URL hash; content-hash deduplication
/// happens later, at Claim-merge time (§4.C4).
#[derive(Default)]
pub struct SharedEvidencePool {
    seen_url_hashes: DashSet<u64>,
    evidence: Mutex<Vec<Evidence>>,
}

impl SharedEvidencePool {
    /// Construct an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a researcher's candidate evidence, returning how many items were
    /// newly accepted (i.e. whose normalized URL hash had not been seen).
    pub fn add_evidence(&self, candidates: Vec<Evidence>, _agent_name: &str) -> usize {
        let mut accepted = 0;
        let mut guard = self.evidence.lock();
        for evidence in candidates {
            if self.seen_url_hashes.insert(url_hash(&evidence.normalized_url)) {
                guard.push(evidence);
                accepted += 1;
            }
        }
        accepted
    }

    /// A snapshot of the pool's current contents, in insertion order.
    pub fn snapshot(&self) -> Vec<Evidence> {
        self.evidence.lock().clone()
    }

    /// Number of evidence items currently held.
    pub fn len(&self) -> usize {
        self.evidence.lock().len()
    }

    /// Whether the pool currently holds no evidence.
    pub fn is_empty(&self) -> bool {
        self.evidence.lock().is_empty()
    }

    /// Consume the pool, returning its contents. Used at Phase 4 merge-back
    /// (§4.C6), after which the pool is discarded (§3 Ownership).
    pub fn into_evidence(self) -> Vec<Evidence> {
        self.evidence.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(url: &str) -> Evidence {
        Evidence::new(url, "pub", None, "a snippet of some length", None, "test").unwrap()
    }

    #[test]
    fn dedups_by_url_hash() {
        let pool = SharedEvidencePool::new();
        let accepted = pool.add_evidence(
            vec![evidence("https://example.com/a"), evidence("https://example.com/a")],
            "agent-1",
        );
        assert_eq!(accepted, 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn accepts_across_multiple_calls() {
        let pool = SharedEvidencePool::new();
        pool.add_evidence(vec![evidence("https://example.com/a")], "agent-1");
        let accepted = pool.add_evidence(
            vec![evidence("https://example.com/a"), evidence("https://example.com/b")],
            "agent-2",
        );
        assert_eq!(accepted, 1);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let pool = SharedEvidencePool::new();
        pool.add_evidence(vec![evidence("https://example.com/a"), evidence("https://example.com/b")], "agent-1");
        let snapshot = pool.snapshot();
        assert_eq!(snapshot[0].normalized_url, "https://example.com/a");
        assert_eq!(snapshot[1].normalized_url, "https://example.com/b");
    }
}
