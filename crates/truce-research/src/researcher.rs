//! Agentic Researcher (C3): one per panel model, runs a bounded multi-turn
//! search loop against the search toolset and yields candidate evidence.

use std::collections::HashSet;
use std::sync::Arc;

use truce_core::progress::ProgressBus;
use truce_core::types::{Claim, Evidence, TimeWindow};
use truce_search::search::{SearchContext, SearchProvider};

/// Turn index at which the researcher switches to gap-driven search (§4.C3).
pub const GAP_SEARCH_START_TURN: usize = 3;
/// Default maximum number of turns before the researcher stops regardless of
/// evidence sufficiency.
pub const DEFAULT_MAX_TURNS: usize = 5;
/// Minimum unique sources for `sufficient_evidence` (§4.C3).
pub const SUFFICIENT_SOURCE_COUNT: usize = 8;
/// Minimum unique domains for `sufficient_evidence` (§4.C3).
pub const SUFFICIENT_DOMAIN_COUNT: usize = 4;

const PERSPECTIVES: &[&str] = &[
    "research study evidence",
    "government official data",
    "fact check verification",
    "expert academic analysis",
];

const TARGETED_SITES: &[&str] = &["statcan.gc.ca", "canada.ca", "cbc.ca", "reuters.com"];

const GOVERNMENT_DOMAIN_HINTS: &[&str] = &["gc.ca", "canada.ca", ".gov"];

/// Optional wiring for progress/cancellation during a research run.
#[derive(Clone, Copy)]
pub struct ResearchContext<'a> {
    /// The process-wide progress bus, if wired up.
    pub progress: Option<&'a ProgressBus>,
    /// The session id to check for cancellation and emit events against.
    pub session_id: Option<&'a str>,
}

impl<'a> ResearchContext<'a> {
    /// A context with no progress/cancellation wiring.
    pub fn none() -> Self {
        Self { progress: None, session_id: None }
    }

    fn search_ctx(&self) -> SearchContext<'a> {
        SearchContext { progress: self.progress, session_id: self.session_id }
    }

    fn is_cancelled(&self) -> bool {
        match (self.progress, self.session_id) {
            (Some(bus), Some(session_id)) => bus.check_cancelled(session_id).is_err(),
            _ => false,
        }
    }
}

struct AnalysisState {
    sufficient_evidence: bool,
    next_actions: Vec<&'static str>,
}

fn analyze(evidence: &[Evidence]) -> AnalysisState {
    let total = evidence.len();
    let domains: HashSet<&str> = evidence.iter().map(|e| e.domain.as_str()).collect();
    let has_government_source = evidence
        .iter()
        .any(|e| GOVERNMENT_DOMAIN_HINTS.iter().any(|hint| e.domain.ends_with(hint)));

    let mut next_actions = Vec::new();
    if !has_government_source {
        next_actions.push("government_sources");
    }
    if domains.len() < SUFFICIENT_DOMAIN_COUNT {
        next_actions.push("alternative_perspectives");
    }

    AnalysisState {
        sufficient_evidence: total >= SUFFICIENT_SOURCE_COUNT && domains.len() >= SUFFICIENT_DOMAIN_COUNT,
        next_actions,
    }
}

/// Runs the bounded, per-model research loop described in §4.C3.
pub struct AgenticResearcher {
    agent_name: String,
    search: Arc<dyn SearchProvider>,
    max_turns: usize,
}

impl AgenticResearcher {
    /// Construct a researcher named `agent_name` (used in the provenance tag
    /// of its evidence), bounded to the default turn limit.
    pub fn new(agent_name: impl Into<String>, search: Arc<dyn SearchProvider>) -> Self {
        Self { agent_name: agent_name.into(), search, max_turns: DEFAULT_MAX_TURNS }
    }

    /// Override the maximum number of turns.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    fn queries_for_turn(&self, turn: usize, claim_text: &str, next_actions: &[&str]) -> Vec<String> {
        match turn {
            0 => vec![claim_text.to_string()],
            1 => PERSPECTIVES.iter().map(|p| format!("{p} {claim_text}")).collect(),
            2 => TARGETED_SITES.iter().map(|site| format!("site:{site} {claim_text}")).collect(),
            _ => {
                let query = if next_actions.contains(&"government_sources") {
                    format!("government statistics data {claim_text}")
                } else if next_actions.contains(&"alternative_perspectives") {
                    format!("counterargument opposing view {claim_text}")
                } else {
                    format!("detailed analysis verification {claim_text}")
                };
                vec![query]
            }
        }
    }

    /// Run the turn-indexed research loop (turns 0..max_turns, terminating
    /// early once evidence is sufficient) and return candidate evidence
    /// tagged with this researcher's provenance (§4.C3).
    pub async fn conduct_research(
        &self,
        claim: &Claim,
        time_window: Option<&TimeWindow>,
        ctx: ResearchContext<'_>,
    ) -> Vec<Evidence> {
        let mut collected: Vec<Evidence> = Vec::new();
        let mut next_actions: Vec<&'static str> = Vec::new();

        for turn in 0..self.max_turns {
            if ctx.is_cancelled() {
                tracing::debug!(agent = %self.agent_name, turn, "research cancelled");
                break;
            }

            let queries = self.queries_for_turn(turn, &claim.text, &next_actions);
            let strategy = turn_strategy_tag(turn);

            for query in queries {
                let raw_sources = self
                    .search
                    .search_web(&query, time_window, strategy, ctx.search_ctx())
                    .await;

                for source in raw_sources {
                    match Evidence::new(
                        source.url,
                        source.publisher,
                        source.title,
                        source.snippet,
                        source.published_at,
                        format!("{}_research", self.agent_name),
                    ) {
                        Ok(evidence) => collected.push(evidence),
                        Err(err) => {
                            tracing::debug!(agent = %self.agent_name, turn, error = %err, "dropped malformed source");
                        }
                    }
                }
            }

            let analysis = analyze(&collected);
            next_actions = analysis.next_actions;
            if analysis.sufficient_evidence {
                tracing::debug!(agent = %self.agent_name, turn, "sufficient evidence reached, terminating early");
                break;
            }
        }

        collected
    }
}

fn turn_strategy_tag(turn: usize) -> &'static str {
    match turn {
        0 => "broad_search",
        1 => "perspective_search",
        2 => "targeted_source_search",
        _ => "gap_search",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use truce_core::types::RawSource;
    use truce_search::search::NullSearchProvider;

    struct CountingProvider {
        sources_per_call: usize,
        domain_prefix: &'static str,
    }

    #[async_trait]
    impl SearchProvider for CountingProvider {
        async fn search_web(
            &self,
            _query: &str,
            _window: Option<&TimeWindow>,
            _strategy: &str,
            _ctx: SearchContext<'_>,
        ) -> Vec<RawSource> {
            (0..self.sources_per_call)
                .map(|i| RawSource {
                    title: Some(format!("title {i}")),
                    url: format!("https://{}{}.example.com/{}", self.domain_prefix, i, i),
                    snippet: "a snippet of reasonable length for testing purposes".to_string(),
                    publisher: "pub".to_string(),
                    published_at: None,
                    domain: None,
                    strategy: String::new(),
                })
                .collect()
        }
    }

    fn claim() -> Claim {
        Claim::new("Violent crime in Canada is rising quickly", "crime", vec![]).unwrap()
    }

    #[tokio::test]
    async fn null_provider_yields_no_evidence() {
        let researcher = AgenticResearcher::new("agent1", Arc::new(NullSearchProvider));
        let evidence = researcher.conduct_research(&claim(), None, ResearchContext::none()).await;
        assert!(evidence.is_empty());
    }

    #[tokio::test]
    async fn evidence_is_tagged_with_agent_provenance() {
        let researcher = AgenticResearcher::new("agent1", Arc::new(CountingProvider { sources_per_call: 1, domain_prefix: "d" })).with_max_turns(1);
        let evidence = researcher.conduct_research(&claim(), None, ResearchContext::none()).await;
        assert!(!evidence.is_empty());
        assert!(evidence[0].provenance == "agent1_research");
    }

    #[tokio::test]
    async fn terminates_early_once_sufficient_evidence() {
        let researcher = AgenticResearcher::new("agent1", Arc::new(CountingProvider { sources_per_call: 10, domain_prefix: "d" })).with_max_turns(5);
        let evidence = researcher.conduct_research(&claim(), None, ResearchContext::none()).await;
        // turn 0 alone yields 10 distinct-domain sources, well past the 8/4 threshold.
        assert!(evidence.len() >= SUFFICIENT_SOURCE_COUNT);
    }

    #[test]
    fn analyze_flags_missing_government_source() {
        let evidence = vec![Evidence::new("https://example.com/a", "pub", None, "snippet text here", None, "test").unwrap()];
        let analysis = analyze(&evidence);
        assert!(analysis.next_actions.contains(&"government_sources"));
        assert!(!analysis.sufficient_evidence);
    }
}
