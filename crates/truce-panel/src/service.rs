//! The plain async functions an embedding HTTP layer wires to the routes in
//! §6: `verify_claim` (with the §4.C8 cache read/write protocol),
//! `cancel_session`, and `subscribe_progress`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_stream::Stream;
use truce_core::aggregate::reconcile;
use truce_core::api::{CancelResponse, TimeWindowDto, VerifyResponse};
use truce_core::cache::{build_cache_key, compute_sources_hash, VerificationCache};
use truce_core::claim_registry::ClaimRegistry;
use truce_core::progress::{ProgressBus, ProgressEvent};
use truce_core::types::{Claim, Evidence, TimeWindow, VerificationRecord};
use truce_providers::PanelAdapter;
use truce_search::search::SearchProvider;

use crate::error::Result;
use crate::orchestrator::{run_panel_evaluation, PanelRunContext};

fn filter_by_window(evidence: &[Evidence], window: &TimeWindow) -> Vec<Evidence> {
    evidence.iter().filter(|e| window.contains(e.published_at)).cloned().collect()
}

fn build_record(claim: &Claim, filtered: &[Evidence], providers: &[String], window: &TimeWindow) -> VerificationRecord {
    VerificationRecord {
        id: uuid::Uuid::new_v4(),
        claim_slug: claim.id.to_string(),
        verdict: VerificationRecord::derive_verdict(&claim.model_assessments),
        providers: providers.to_vec(),
        evidence_ids: filtered.iter().map(|e| e.id).collect(),
        sources_hash: compute_sources_hash(filtered),
        time_window: window.clone(),
        created_at: Utc::now(),
    }
}

fn to_response(claim: &Claim, cached: bool, record: &VerificationRecord) -> VerifyResponse {
    VerifyResponse {
        verification_id: record.id,
        cached,
        verdict: record.verdict,
        created_at: record.created_at,
        providers: record.providers.clone(),
        evidence_ids: record.evidence_ids.clone(),
        assessment_ids: claim.model_assessments.iter().map(|a| a.id).collect(),
        time_window: TimeWindowDto::from(&record.time_window),
    }
}

/// Reconcile `claim`'s latest panel summary against a complementary peer
/// claim on file in `registry` (§4.C7), updating both the claim's own
/// summary and the peer's registry entry when reconciliation flips either
/// side. Then records `claim`'s (possibly-reconciled) summary back into the
/// registry so later claims can find it as a peer in turn.
fn reconcile_with_registry(claim: &mut Claim, registry: &ClaimRegistry) {
    if let Some(peer) = registry.find_complementary(claim.id, &claim.text) {
        let (peer_id, peer_text, peer_summary) = peer;
        if let Some(latest) = claim.panel_results.back_mut() {
            let (reconciled_self, reconciled_peer) = reconcile(latest.summary, peer_summary);
            latest.summary = reconciled_self;
            registry.record(peer_id, &peer_text, reconciled_peer);
        }
    }

    if let Some(latest) = claim.panel_results.back() {
        registry.record(claim.id, &claim.text, latest.summary);
    }
}

/// Verify `claim` against `adapters`, implementing the §4.C8 cache protocol:
/// a fresh evidence gather is always attempted (unless `agentic=false`, in
/// which case the claim's existing evidence is used as-is); if new evidence
/// was found the result is necessarily a cache miss, otherwise the cached
/// record is returned unless `force` bypasses it. After aggregation, `registry`
/// is consulted for a complementary peer claim (§4.C7) and, if one is on
/// file, both summaries are reconciled before either is recorded.
#[allow(clippy::too_many_arguments)]
pub async fn verify_claim(
    claim: &mut Claim,
    cache: &VerificationCache,
    registry: &ClaimRegistry,
    adapters: &[Box<dyn PanelAdapter>],
    search: Arc<dyn SearchProvider>,
    time_start: Option<DateTime<Utc>>,
    time_end: Option<DateTime<Utc>>,
    providers: Vec<String>,
    force: bool,
    agentic: bool,
    ctx: PanelRunContext<'_>,
) -> Result<VerifyResponse> {
    let window = TimeWindow::new(time_start, time_end)?;

    let existing_filtered = filter_by_window(&claim.evidence, &window);
    let existing_key = build_cache_key(&claim.text, &window, &providers, &existing_filtered);

    let prior_ids: HashSet<uuid::Uuid> = claim.evidence.iter().map(|e| e.id).collect();

    run_panel_evaluation(claim, adapters, search, Some(&window), agentic, ctx).await;
    reconcile_with_registry(claim, registry);

    let new_evidence_added = claim.evidence.iter().any(|e| !prior_ids.contains(&e.id));
    let filtered = filter_by_window(&claim.evidence, &window);

    if new_evidence_added {
        let cache_key = build_cache_key(&claim.text, &window, &providers, &filtered);
        let record = build_record(claim, &filtered, &providers, &window);
        cache.put(cache_key, record.clone());
        return Ok(to_response(claim, false, &record));
    }

    if !force {
        if let Some(cached) = cache.get(&existing_key) {
            return Ok(to_response(claim, true, &cached));
        }
    }

    let record = build_record(claim, &filtered, &providers, &window);
    cache.put(existing_key, record.clone());
    Ok(to_response(claim, false, &record))
}

/// Mark `session_id` cancelled on `bus` (§6 `DELETE /claims/progress/{session_id}`).
pub fn cancel_session(bus: &ProgressBus, session_id: &str) -> Result<CancelResponse> {
    bus.cancel(session_id)?;
    Ok(CancelResponse::default())
}

/// Subscribe to `session_id`'s progress stream (§6 `GET /claims/progress/{session_id}`).
pub fn subscribe_progress(bus: &ProgressBus, session_id: &str) -> Option<impl Stream<Item = ProgressEvent>> {
    bus.subscribe(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use truce_providers::StubAdapter;
    use truce_search::search::NullSearchProvider;

    fn claim() -> Claim {
        let mut claim = Claim::new("Test claim about crime statistics trends", "crime", vec![]).unwrap();
        claim.add_evidence(Evidence::new("https://example.com/a", "pub", None, "evidence one snippet", None, "test").unwrap());
        claim.add_evidence(Evidence::new("https://example.com/b", "pub", None, "evidence two snippet", None, "test").unwrap());
        claim
    }

    fn adapters() -> Vec<Box<dyn PanelAdapter>> {
        vec![Box::new(StubAdapter::new("stub", "model-a"))]
    }

    #[tokio::test]
    async fn s4_second_verify_is_cached_with_same_id() {
        let mut c = claim();
        let cache = VerificationCache::new();
        let registry = ClaimRegistry::new();
        let a = adapters();

        let first = verify_claim(&mut c, &cache, &registry, &a, Arc::new(NullSearchProvider), None, None, vec![], false, false, PanelRunContext::none())
            .await
            .unwrap();
        assert!(!first.cached);

        let second = verify_claim(&mut c, &cache, &registry, &a, Arc::new(NullSearchProvider), None, None, vec![], false, false, PanelRunContext::none())
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.verification_id, first.verification_id);
    }

    #[tokio::test]
    async fn s5_force_refresh_yields_new_id() {
        let mut c = claim();
        let cache = VerificationCache::new();
        let registry = ClaimRegistry::new();
        let a = adapters();

        let first = verify_claim(&mut c, &cache, &registry, &a, Arc::new(NullSearchProvider), None, None, vec![], false, false, PanelRunContext::none())
            .await
            .unwrap();
        let forced = verify_claim(&mut c, &cache, &registry, &a, Arc::new(NullSearchProvider), None, None, vec![], true, false, PanelRunContext::none())
            .await
            .unwrap();

        assert!(!forced.cached);
        assert_ne!(forced.verification_id, first.verification_id);
    }

    #[tokio::test]
    async fn s6_time_window_filters_evidence_ids() {
        let mut c = Claim::new("Test claim about crime statistics trends", "crime", vec![]).unwrap();
        let recent = Evidence::new("https://example.com/recent", "pub", None, "recent snippet", Some(Utc::now() - chrono::Duration::days(1)), "test").unwrap();
        let old = Evidence::new("https://example.com/old", "pub", None, "old snippet", Some(Utc::now() - chrono::Duration::days(365 * 5)), "test").unwrap();
        let recent_id = recent.id;
        c.add_evidence(old);
        c.add_evidence(recent);

        let cache = VerificationCache::new();
        let registry = ClaimRegistry::new();
        let a = adapters();
        let start = Utc::now() - chrono::Duration::days(2);
        let end = Utc::now() + chrono::Duration::days(1);

        let response = verify_claim(&mut c, &cache, &registry, &a, Arc::new(NullSearchProvider), Some(start), Some(end), vec![], false, false, PanelRunContext::none())
            .await
            .unwrap();

        assert_eq!(response.evidence_ids, vec![recent_id]);
    }

    #[tokio::test]
    async fn inverted_time_window_errors() {
        let mut c = claim();
        let cache = VerificationCache::new();
        let registry = ClaimRegistry::new();
        let a = adapters();
        let start = Utc::now();
        let end = start - chrono::Duration::days(1);

        let result = verify_claim(&mut c, &cache, &registry, &a, Arc::new(NullSearchProvider), Some(start), Some(end), vec![], false, false, PanelRunContext::none()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn reconciles_against_complementary_peer_claim() {
        use truce_core::types::{PanelResult, PanelSummary, PanelVerdict};

        let registry = ClaimRegistry::new();
        let peer_id = uuid::Uuid::new_v4();
        registry.record(
            peer_id,
            "Violent crime in Canada is falling quickly across provinces",
            PanelSummary { support_confidence: 0.9, refute_confidence: 0.1, model_count: 3, verdict: PanelVerdict::True },
        );

        let mut c = Claim::new("Violent crime in Canada is rising quickly across provinces", "crime", vec![]).unwrap();
        c.push_panel_result(PanelResult {
            prompt: serde_json::json!({}),
            verdicts: vec![],
            summary: PanelSummary { support_confidence: 0.7, refute_confidence: 0.3, model_count: 3, verdict: PanelVerdict::True },
            generated_at: Utc::now(),
        });

        reconcile_with_registry(&mut c, &registry);

        let own_summary = c.panel_results.back().unwrap().summary;
        assert_eq!(own_summary.verdict, PanelVerdict::False);
        assert_eq!(own_summary.support_confidence, 0.3);

        let (_, _, peer_summary) = registry.find_complementary(c.id, &c.text).unwrap();
        assert_eq!(peer_summary.verdict, PanelVerdict::True);
    }

    #[tokio::test]
    async fn cancel_unknown_session_errors() {
        let bus = ProgressBus::new();
        assert!(cancel_session(&bus, "ghost").is_err());
    }
}
