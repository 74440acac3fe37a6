//! Explorer Agent (C2): multi-strategy search, domain-diversity enforcement,
//! and time-window filtering.

use std::collections::HashMap;
use std::sync::Arc;

use truce_core::progress::ProgressBus;
use truce_core::types::{HydratedSource, RawSource, TimeWindow};

use crate::dedup::deduplicate_sources;
use crate::fetch::PageFetcher;
use crate::search::{SearchContext, SearchProvider};

/// Default number of sources `gather_sources` returns (§4.C2).
pub const DEFAULT_TARGET_COUNT: usize = 20;
/// Default per-domain cap share of `target_count` (§4.C2).
pub const DEFAULT_DOMAIN_SHARE: f64 = 0.25;

const STRATEGY_PREFIXES: &[(&str, &str)] = &[
    ("direct", ""),
    ("academic", "research study analysis "),
    ("government", "government official statistics "),
    ("news", "news report investigation "),
];

/// Optional wiring for progress-bus events during a gather run.
#[derive(Clone, Copy)]
pub struct ExplorerContext<'a> {
    /// The process-wide progress bus, if wired up.
    pub progress: Option<&'a ProgressBus>,
    /// The session id events are emitted against.
    pub session_id: Option<&'a str>,
}

impl<'a> ExplorerContext<'a> {
    /// A context with no progress wiring.
    pub fn none() -> Self {
        Self { progress: None, session_id: None }
    }

    fn search_ctx(&self) -> SearchContext<'a> {
        SearchContext { progress: self.progress, session_id: self.session_id }
    }

    fn emit(&self, stage: &str, message: &str) {
        if let (Some(bus), Some(session_id)) = (self.progress, self.session_id) {
            bus.emit(session_id, stage, message, serde_json::json!({}));
        }
    }
}

/// Runs the four-strategy gather algorithm over a search provider (§4.C2).
pub struct ExplorerAgent {
    search: Arc<dyn SearchProvider>,
    fetcher: PageFetcher,
    target_count: usize,
    domain_share: f64,
}

impl ExplorerAgent {
    /// Construct an explorer with the default target count and domain share.
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            fetcher: PageFetcher::new(),
            target_count: DEFAULT_TARGET_COUNT,
            domain_share: DEFAULT_DOMAIN_SHARE,
        }
    }

    /// Override the target result count.
    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.target_count = target_count;
        self
    }

    /// Override the per-domain cap share.
    pub fn with_domain_share(mut self, domain_share: f64) -> Self {
        self.domain_share = domain_share;
        self
    }

    fn max_per_domain(&self) -> usize {
        std::cmp::max(1, (self.target_count as f64 * self.domain_share).floor() as usize)
    }

    /// Gather at most `target_count` sources for `claim_text` across the
    /// four search strategies, enriched for the direct strategy, deduplicated,
    /// time-filtered, and domain-diversified (§4.C2 algorithm steps 1-5).
    pub async fn gather_sources(
        &self,
        claim_text: &str,
        time_window: Option<&TimeWindow>,
        ctx: ExplorerContext<'_>,
    ) -> Vec<HydratedSource> {
        ctx.emit("searching", "gathering sources across strategies");

        let mut batch: Vec<RawSource> = Vec::new();

        for (strategy, prefix) in STRATEGY_PREFIXES {
            let query = format!("{prefix}{claim_text}");

            let mut results = self
                .search
                .search_web(&query, time_window, strategy, ctx.search_ctx())
                .await;
            if *strategy != "direct" {
                results.truncate(10);
            }

            if *strategy == "direct" {
                for source in &mut results {
                    self.enrich_direct_source(source).await;
                }
            }

            batch.extend(results);
        }

        ctx.emit("processing_sources", "deduplicating and filtering gathered sources");

        let hydrated = deduplicate_sources(batch);
        let time_filtered: Vec<HydratedSource> = hydrated
            .into_iter()
            .filter(|h| time_window.map_or(true, |w| w.contains(h.source.published_at)))
            .collect();

        let selected = self.enforce_domain_diversity(time_filtered);
        ctx.emit("evidence_found", &format!("{} sources selected", selected.len()));
        selected
    }

    async fn enrich_direct_source(&self, source: &mut RawSource) {
        let fetched = self.fetcher.fetch_page(&source.url).await;
        if !fetched.is_sentinel_snippet() {
            source.snippet = fetched.snippet;
        }
        if !fetched.is_sentinel_publisher() {
            source.publisher = fetched.publisher;
        }
        if let Some(title) = fetched.title {
            source.title = Some(title);
        }
        if fetched.published_at.is_some() {
            source.published_at = fetched.published_at;
        }
    }

    /// Iterate sources in order, emitting one only if its domain has not
    /// already contributed `max_per_domain` items; stop at `target_count`.
    fn enforce_domain_diversity(&self, sources: Vec<HydratedSource>) -> Vec<HydratedSource> {
        let max_per_domain = self.max_per_domain();
        let mut per_domain: HashMap<String, usize> = HashMap::new();
        let mut selected = Vec::new();

        for source in sources {
            if selected.len() >= self.target_count {
                break;
            }
            let count = per_domain.entry(source.domain.clone()).or_insert(0);
            if *count >= max_per_domain {
                continue;
            }
            *count += 1;
            selected.push(source);
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::NullSearchProvider;
    use async_trait::async_trait;
    use tokio::sync::Mutex as AsyncMutex;

    struct FixedSearchProvider {
        by_strategy: AsyncMutex<HashMap<String, Vec<RawSource>>>,
    }

    #[async_trait]
    impl SearchProvider for FixedSearchProvider {
        async fn search_web(
            &self,
            _query: &str,
            _window: Option<&TimeWindow>,
            strategy: &str,
            _ctx: SearchContext<'_>,
        ) -> Vec<RawSource> {
            self.by_strategy.lock().await.get(strategy).cloned().unwrap_or_default()
        }
    }

    fn raw(url: &str, domain_tag: &str) -> RawSource {
        RawSource {
            title: Some(format!("title {domain_tag}")),
            url: url.to_string(),
            snippet: "a snippet long enough to pass filters".to_string(),
            publisher: "pub".to_string(),
            published_at: None,
            domain: None,
            strategy: String::new(),
        }
    }

    #[tokio::test]
    async fn s9_domain_diversity_caps_contributions() {
        let mut by_strategy = HashMap::new();
        let mut direct = Vec::new();
        for i in 0..6 {
            direct.push(raw(&format!("https://same.com/{i}"), "same"));
        }
        for i in 0..3 {
            direct.push(raw(&format!("https://other{i}.com/x"), "other"));
        }
        by_strategy.insert("direct".to_string(), direct);
        for strategy in ["academic", "government", "news"] {
            by_strategy.insert(strategy.to_string(), Vec::new());
        }

        let provider = Arc::new(FixedSearchProvider { by_strategy: AsyncMutex::new(by_strategy) });
        let agent = ExplorerAgent::new(provider).with_target_count(6).with_domain_share(0.4);
        let sources = agent.gather_sources("a claim about crime", None, ExplorerContext::none()).await;

        assert!(sources.len() <= 6);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for s in &sources {
            *counts.entry(s.domain.clone()).or_insert(0) += 1;
        }
        assert!(counts.values().all(|&c| c <= 2));
    }

    #[tokio::test]
    async fn null_provider_yields_empty_gather() {
        let agent = ExplorerAgent::new(Arc::new(NullSearchProvider));
        let sources = agent.gather_sources("a claim about crime statistics", None, ExplorerContext::none()).await;
        assert!(sources.is_empty());
    }

    #[test]
    fn max_per_domain_floor_is_at_least_one() {
        let agent = ExplorerAgent::new(Arc::new(NullSearchProvider)).with_target_count(3).with_domain_share(0.1);
        assert_eq!(agent.max_per_domain(), 1);
    }
}
