//! The search half of the search/fetch toolset (C1): a provider-agnostic
//! trait plus a Brave Search implementation and a null fallback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use truce_core::progress::ProgressBus;
use truce_core::types::{RawSource, TimeWindow};

use crate::rate_limiter::RateLimiter;

/// Optional session context used to surface non-fatal failures through the
/// progress bus (§4.C1: "emits a non-fatal event through C9").
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    /// The process-wide progress bus, if one is wired up.
    pub progress: Option<&'a ProgressBus>,
    /// The session to emit events against.
    pub session_id: Option<&'a str>,
}

impl<'a> SearchContext<'a> {
    /// A context with no progress wiring attached.
    pub fn none() -> Self {
        Self { progress: None, session_id: None }
    }

    fn emit_api_error(&self, message: &str) {
        if let (Some(bus), Some(session_id)) = (self.progress, self.session_id) {
            bus.emit(session_id, "api_error", message, serde_json::json!({}));
        }
    }
}

/// Uniform interface over external search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Issue a search query tagged with a gathering strategy. Never
    /// propagates a transport/config error: an unreachable or unconfigured
    /// provider yields an empty list (§4.C1).
    async fn search_web(
        &self,
        query: &str,
        window: Option<&TimeWindow>,
        strategy: &str,
        ctx: SearchContext<'_>,
    ) -> Vec<RawSource>;
}

/// A search provider that always returns no results. Used when
/// `BRAVE_SEARCH_API_KEY` is unset, and as the "null adapter" in tests (§9
/// DESIGN NOTES: "Ship a null adapter ... swap it in tests").
#[derive(Debug, Clone, Default)]
pub struct NullSearchProvider;

#[async_trait]
impl SearchProvider for NullSearchProvider {
    async fn search_web(
        &self,
        _query: &str,
        _window: Option<&TimeWindow>,
        _strategy: &str,
        _ctx: SearchContext<'_>,
    ) -> Vec<RawSource> {
        Vec::new()
    }
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
    /// Relative string ("3 days ago"); not parseable to a timestamp, kept
    /// only so deserialization doesn't reject payloads that include it.
    #[serde(default)]
    #[allow(dead_code)]
    age: Option<String>,
    #[serde(default)]
    extra_snippets: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Debug, Deserialize)]
struct BraveSearchResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

/// Default search rate: 2 requests/second (§4.C1).
pub const DEFAULT_SEARCH_RATE_PER_SEC: f64 = 2.0;

/// Web search against the Brave Search API.
pub struct BraveSearchProvider {
    api_key: String,
    count: u32,
    client: reqwest::Client,
    limiter: RateLimiter,
}

impl BraveSearchProvider {
    /// Construct a provider bound to `api_key`, defaulting to 10 results per
    /// query and the default rate limit.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            count: 10,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            limiter: RateLimiter::new(DEFAULT_SEARCH_RATE_PER_SEC),
        }
    }

    /// Override the per-query result count.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    async fn query(&self, query: &str) -> crate::error::Result<Vec<RawSource>> {
        self.limiter.acquire().await;

        let url = format!(
            "https://api.search.brave.com/res/v1/web/search?q={}&count={}",
            urlencoding::encode(query),
            self.count
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(crate::error::Error::Other(anyhow::anyhow!(
                "brave search returned status {status}"
            )));
        }

        let parsed: BraveSearchResponse = response.json().await?;
        let results = parsed.web.map(|w| w.results).unwrap_or_default();

        Ok(results
            .into_iter()
            .map(|r| RawSource {
                title: Some(r.title),
                url: r.url,
                snippet: r
                    .extra_snippets
                    .and_then(|s| s.first().cloned())
                    .unwrap_or(r.description),
                publisher: String::new(),
                // Brave's `age` field is a relative string ("3 days ago"), not parseable to a timestamp.
                published_at: None,
                domain: None,
                strategy: String::new(),
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search_web(
        &self,
        query: &str,
        _window: Option<&TimeWindow>,
        strategy: &str,
        ctx: SearchContext<'_>,
    ) -> Vec<RawSource> {
        match self.query(query).await {
            Ok(mut sources) => {
                for source in &mut sources {
                    source.strategy = strategy.to_string();
                }
                sources
            }
            Err(err) => {
                tracing::warn!(strategy, error = %err, "search_web failed, returning empty result");
                ctx.emit_api_error(&format!("search failed for strategy '{strategy}': {err}"));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_provider_always_returns_empty() {
        let provider = NullSearchProvider;
        let results = provider
            .search_web("anything", None, "direct", SearchContext::none())
            .await;
        assert!(results.is_empty());
    }
}
