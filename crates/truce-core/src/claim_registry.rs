//! Claim Registry (C7 peer lookup): a process-wide index of the most recent
//! panel summary per claim, giving `aggregate::reconcile` a peer claim to
//! reconcile against. An explicit service struct, passed through like
//! [`crate::cache::VerificationCache`] rather than hidden behind a singleton.

use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::aggregate::are_complementary;
use crate::types::PanelSummary;

#[derive(Default)]
pub struct ClaimRegistry {
    entries: Mutex<HashMap<Uuid, (String, PanelSummary)>>,
}

impl ClaimRegistry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or replace `claim_id`'s most recent panel summary.
    pub fn record(&self, claim_id: Uuid, claim_text: &str, summary: PanelSummary) {
        self.entries.lock().insert(claim_id, (claim_text.to_string(), summary));
    }

    /// Find another registered claim whose text is complementary (§4.C7) to
    /// `claim_text`, returning its id, text, and most recent summary.
    pub fn find_complementary(&self, claim_id: Uuid, claim_text: &str) -> Option<(Uuid, String, PanelSummary)> {
        self.entries
            .lock()
            .iter()
            .find(|(&id, (text, _))| id != claim_id && are_complementary(claim_text, text))
            .map(|(&id, (text, summary))| (id, text.clone(), *summary))
    }

    /// Number of claims currently registered.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the registry currently holds no claims.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Remove every registered claim. Used by tests.
    pub fn reset(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PanelVerdict;

    fn summary(support: f64, refute: f64, verdict: PanelVerdict) -> PanelSummary {
        PanelSummary { support_confidence: support, refute_confidence: refute, model_count: 3, verdict }
    }

    #[test]
    fn finds_registered_complementary_claim() {
        let registry = ClaimRegistry::new();
        let peer_id = Uuid::new_v4();
        registry.record(
            peer_id,
            "Violent crime in Canada is falling quickly across provinces",
            summary(0.2, 0.8, PanelVerdict::False),
        );

        let this_id = Uuid::new_v4();
        let found = registry.find_complementary(this_id, "Violent crime in Canada is rising quickly across provinces");
        assert_eq!(found.map(|(id, _, _)| id), Some(peer_id));
    }

    #[test]
    fn does_not_match_itself() {
        let registry = ClaimRegistry::new();
        let id = Uuid::new_v4();
        registry.record(id, "Violent crime in Canada is rising quickly", summary(0.8, 0.2, PanelVerdict::True));
        assert!(registry.find_complementary(id, "Violent crime in Canada is rising quickly").is_none());
    }

    #[test]
    fn unrelated_claim_not_found() {
        let registry = ClaimRegistry::new();
        registry.record(Uuid::new_v4(), "Coffee prices in Brazil are falling", summary(0.7, 0.3, PanelVerdict::True));
        assert!(registry
            .find_complementary(Uuid::new_v4(), "Violent crime in Canada is rising quickly across provinces")
            .is_none());
    }

    #[test]
    fn reset_clears_all_entries() {
        let registry = ClaimRegistry::new();
        registry.record(Uuid::new_v4(), "Some claim text here", summary(0.5, 0.5, PanelVerdict::Mixed));
        assert_eq!(registry.len(), 1);
        registry.reset();
        assert!(registry.is_empty());
    }
}
