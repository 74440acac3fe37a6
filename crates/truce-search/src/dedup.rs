//! Source deduplication and hydration (§4.C1 `deduplicate_sources`).

use std::collections::HashSet;

use chrono::Utc;
use truce_core::normalize::{content_hash, extract_domain, normalize_url};
use truce_core::types::{HydratedSource, RawSource};

/// Hydrate each source with `normalized_url`, `domain`, `content_hash`, and
/// `retrieved_at`, dropping subsequent occurrences of any `normalized_url`
/// already seen within the batch. Sources with an unparseable URL are
/// dropped silently.
pub fn deduplicate_sources(raw_sources: Vec<RawSource>) -> Vec<HydratedSource> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw_sources.len());

    for source in raw_sources {
        let Ok(normalized_url) = normalize_url(&source.url) else {
            continue;
        };
        if !seen.insert(normalized_url.clone()) {
            continue;
        }

        let domain = extract_domain(&normalized_url);
        let content_hash = content_hash(source.title.as_deref().unwrap_or(""), &source.snippet);

        out.push(HydratedSource {
            source,
            normalized_url,
            domain,
            content_hash,
            retrieved_at: Utc::now(),
        });
    }

    out
}
