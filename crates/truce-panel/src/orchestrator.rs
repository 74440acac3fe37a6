//! Panel Orchestrator (C6): the two-phase (agentic) / single-phase
//! (non-agentic) pipeline that turns a claim and a model lineup into a
//! [`PanelResult`].

use std::sync::Arc;

use chrono::Utc;
use truce_core::aggregate::aggregate_panel;
use truce_core::direction::neutralize_direction;
use truce_core::progress::ProgressBus;
use truce_core::types::{Claim, Evidence, PanelResult, TimeWindow};
use truce_providers::PanelAdapter;
use truce_research::pool::SharedEvidencePool;
use truce_research::researcher::{AgenticResearcher, ResearchContext};
use truce_search::explorer::{ExplorerAgent, ExplorerContext};
use truce_search::search::SearchProvider;

use crate::prompt::{build_evidence_lookup, build_prompt};

/// Optional progress/cancellation wiring for one panel run.
#[derive(Clone, Copy)]
pub struct PanelRunContext<'a> {
    /// The process-wide progress bus, if wired up.
    pub progress: Option<&'a ProgressBus>,
    /// The session id events are emitted against and cancellation is checked on.
    pub session_id: Option<&'a str>,
}

impl<'a> PanelRunContext<'a> {
    /// A context with no progress/cancellation wiring.
    pub fn none() -> Self {
        Self { progress: None, session_id: None }
    }

    fn research_ctx(&self) -> ResearchContext<'a> {
        ResearchContext { progress: self.progress, session_id: self.session_id }
    }

    fn explorer_ctx(&self) -> ExplorerContext<'a> {
        ExplorerContext { progress: self.progress, session_id: self.session_id }
    }

    fn emit(&self, stage: &str, message: &str) {
        if let (Some(bus), Some(session_id)) = (self.progress, self.session_id) {
            bus.emit(session_id, stage, message, serde_json::json!({}));
        }
    }

    fn is_cancelled(&self) -> bool {
        match (self.progress, self.session_id) {
            (Some(bus), Some(session_id)) => bus.check_cancelled(session_id).is_err(),
            _ => false,
        }
    }
}

/// Run Phase 1 (parallel per-model research, §5: "Researchers ... run in
/// parallel ... results are collected after all complete") against a
/// direction-neutralized copy of `claim`'s text, seeding the pool with
/// `claim`'s pre-existing evidence first so the enriched prompt never loses
/// evidence already on file (invariant 8: "Monotone evidence"). Alongside the
/// per-model researchers, a single [`ExplorerAgent`] pass (§4.C2) runs the
/// four-strategy gather/dedup/domain-diversity algorithm over the same
/// neutralized text and its sources are pooled too, so C3's turn-based
/// research and C2's broad sweep both land in the shared pool.
async fn gather_phase(
    claim: &Claim,
    adapters: &[Box<dyn PanelAdapter>],
    search: &Arc<dyn SearchProvider>,
    time_window: Option<&TimeWindow>,
    ctx: PanelRunContext<'_>,
) -> SharedEvidencePool {
    let pool = SharedEvidencePool::new();
    pool.add_evidence(claim.evidence.clone(), "seed");

    let neutralized_text = neutralize_direction(&claim.text);
    let research_claim = Claim::new(neutralized_text, claim.topic.clone(), claim.entities.clone())
        .unwrap_or_else(|_| claim.clone());

    ctx.emit("searching", "spawning per-model researchers");

    let explorer = ExplorerAgent::new(Arc::clone(search));
    let explorer_future = explorer.gather_sources(&research_claim.text, time_window, ctx.explorer_ctx());

    let research_futures = adapters.iter().map(|adapter| {
        let researcher = AgenticResearcher::new(adapter.model_name().to_string(), Arc::clone(search));
        let agent_name = adapter.model_name().to_string();
        let research_claim = &research_claim;
        let research_ctx = ctx.research_ctx();
        async move {
            let evidence = researcher.conduct_research(research_claim, time_window, research_ctx).await;
            (agent_name, evidence)
        }
    });

    let (explorer_sources, results) =
        futures::future::join(explorer_future, futures::future::join_all(research_futures)).await;

    let explorer_evidence: Vec<Evidence> = explorer_sources
        .into_iter()
        .filter_map(|hydrated| {
            let source = hydrated.source;
            Evidence::new(source.url, source.publisher, source.title, source.snippet, source.published_at, "explorer_agent").ok()
        })
        .collect();
    pool.add_evidence(explorer_evidence, "explorer_agent");

    for (agent_name, evidence) in results {
        pool.add_evidence(evidence, &agent_name);
    }

    pool
}

/// Run the full §4.C6 pipeline: agentic mode gathers fresh evidence via one
/// researcher per model before evaluating; non-agentic mode evaluates
/// directly against `claim`'s existing evidence.
pub async fn run_panel_evaluation(
    claim: &mut Claim,
    adapters: &[Box<dyn PanelAdapter>],
    search: Arc<dyn SearchProvider>,
    time_window: Option<&TimeWindow>,
    agentic: bool,
    ctx: PanelRunContext<'_>,
) -> PanelResult {
    let window = time_window.cloned().unwrap_or_default();

    let enriched_claim = if agentic {
        let pool = gather_phase(claim, adapters, &search, time_window, ctx).await;
        ctx.emit("processing_evidence", "merging pooled evidence into enriched claim");
        let mut enriched = claim.clone();
        enriched.evidence.clear();
        for evidence in pool.into_evidence() {
            enriched.add_evidence(evidence);
        }
        enriched
    } else {
        claim.clone()
    };

    let prompt = build_prompt(&enriched_claim, &window);
    let evidence_lookup = build_evidence_lookup(&enriched_claim);

    ctx.emit("evaluating", "evaluating panel models sequentially");
    let mut verdicts = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        if ctx.is_cancelled() {
            tracing::debug!(provider = adapter.provider_id(), "panel evaluation cancelled");
            break;
        }
        let verdict = adapter.evaluate(&enriched_claim, &prompt, &evidence_lookup).await;
        verdicts.push(verdict);
    }
    ctx.emit("evaluation_complete", "panel evaluation complete");

    for evidence in enriched_claim.evidence {
        claim.add_evidence(evidence);
    }

    let summary = aggregate_panel(&verdicts);
    let result = PanelResult { prompt, verdicts, summary, generated_at: Utc::now() };
    claim.push_panel_result(result.clone());
    result
}
