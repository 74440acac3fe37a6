//! Page fetching and metadata extraction (§4.C1 `fetch_page`).

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use url::Url;

use crate::rate_limiter::RateLimiter;
use crate::ssrf::SsrfConfig;

/// Default fetch rate: 3 requests/second (§4.C1).
pub const DEFAULT_FETCH_RATE_PER_SEC: f64 = 3.0;

/// Sentinel publisher used when a page could not be fetched or parsed.
pub const FALLBACK_PUBLISHER: &str = "Unknown";
/// Sentinel snippet used when a page could not be fetched or parsed.
pub const FALLBACK_SNIPPET: &str = "Content available at source.";

/// Metadata extracted from a fetched page.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// `<title>`, if present.
    pub title: Option<String>,
    /// Meta description, or the first paragraph ≥50 chars, or the fallback sentinel.
    pub snippet: String,
    /// Site name, or the fallback sentinel.
    pub publisher: String,
    /// Publication timestamp parsed from one of several candidate meta tags.
    pub published_at: Option<DateTime<Utc>>,
}

impl PageContent {
    fn fallback() -> Self {
        Self {
            title: None,
            snippet: FALLBACK_SNIPPET.to_string(),
            publisher: FALLBACK_PUBLISHER.to_string(),
            published_at: None,
        }
    }

    /// Whether this content still carries the sentinel fallback values
    /// (§4.C2 step 2: "if the fetched fields are non-sentinel, merge").
    pub fn is_sentinel_snippet(&self) -> bool {
        self.snippet == FALLBACK_SNIPPET
    }

    /// Whether the publisher is still the sentinel fallback value.
    pub fn is_sentinel_publisher(&self) -> bool {
        self.publisher == FALLBACK_PUBLISHER
    }
}

/// Fetches a URL and extracts title/snippet/publisher/publication-date
/// metadata. SSRF-validated before any request is issued; any failure
/// (validation, transport, parsing) yields [`PageContent::fallback`] rather
/// than propagating an error, per §4.C1.
pub struct PageFetcher {
    client: reqwest::Client,
    limiter: RateLimiter,
    ssrf: SsrfConfig,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

const PUBLISHED_AT_SELECTORS: &[&str] = &[
    r#"meta[property="article:published_time"]"#,
    r#"meta[property="og:article:published_time"]"#,
    r#"meta[name="date"]"#,
    r#"meta[name="dc.date"]"#,
    r#"meta[name="pubdate"]"#,
];

impl PageFetcher {
    /// Construct a fetcher with the default fetch rate and SSRF policy.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            limiter: RateLimiter::new(DEFAULT_FETCH_RATE_PER_SEC),
            ssrf: SsrfConfig::default(),
        }
    }

    /// Fetch `url_str` and extract its metadata, never propagating a failure.
    pub async fn fetch_page(&self, url_str: &str) -> PageContent {
        let Ok(url) = Url::parse(url_str) else {
            return PageContent::fallback();
        };
        if let Err(reason) = self.ssrf.validate_url(&url) {
            tracing::warn!(url = url_str, reason, "fetch_page blocked by SSRF policy");
            return PageContent::fallback();
        }

        self.limiter.acquire().await;

        let body = match self.client.get(url.clone()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => body,
                Err(_) => return PageContent::fallback(),
            },
            _ => return PageContent::fallback(),
        };

        extract_page_content(&body)
    }
}

fn meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn extract_page_content(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    let description = meta_content(&document, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&document, r#"meta[property="og:description"]"#));

    let snippet = description.unwrap_or_else(|| first_long_paragraph(&document));

    let publisher = meta_content(&document, r#"meta[property="og:site_name"]"#)
        .unwrap_or_else(|| FALLBACK_PUBLISHER.to_string());

    let published_at = PUBLISHED_AT_SELECTORS
        .iter()
        .find_map(|sel| meta_content(&document, sel))
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    PageContent {
        title,
        snippet: if snippet.trim().is_empty() { FALLBACK_SNIPPET.to_string() } else { snippet },
        publisher,
        published_at,
    }
}

fn first_long_paragraph(document: &Html) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return FALLBACK_SNIPPET.to_string();
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| text.chars().count() >= 50)
        .unwrap_or_else(|| FALLBACK_SNIPPET.to_string())
}
