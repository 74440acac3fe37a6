//! URL normalization, domain extraction, and content hashing shared by the
//! search toolset (C1), explorer agent (C2), and the data model (§3).

use sha2::{Digest, Sha256};
use url::Url;

/// Canonicalize a URL for deduplication: lowercase scheme and host, strip a
/// trailing slash from the path, sort and re-encode query parameters, and
/// drop the fragment.
///
/// Idempotent: `normalize_url(normalize_url(u)?) == normalize_url(u)?` (§8 I1).
pub fn normalize_url(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw)?;

    let scheme = url.scheme().to_ascii_lowercase();
    let _ = url.set_scheme(&scheme);

    if let Some(host) = url.host_str() {
        let host = host.to_ascii_lowercase();
        let _ = url.set_host(Some(&host));
    }

    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    pairs.sort();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &pairs {
            serializer.append_pair(k, v);
        }
        url.set_query(Some(&serializer.finish()));
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Ok(url.to_string())
}

/// Extract the registrable host from an already-normalized URL, or an empty
/// string if it has none (e.g. opaque/file URLs).
pub fn extract_domain(normalized_url: &str) -> String {
    Url::parse(normalized_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// SHA-256 hex digest over lowercased, trimmed `title || snippet` (§3, §2.GLOSSARY).
///
/// Hashes title and snippet via two sequential `digest.update()` calls,
/// hash-equivalent to a single concatenated update.
pub fn content_hash(title: &str, snippet: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.trim().to_ascii_lowercase().as_bytes());
    hasher.update(snippet.trim().to_ascii_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_host_and_scheme() {
        let normalized = normalize_url("HTTPS://Example.COM/Path").unwrap();
        assert_eq!(normalized, "https://example.com/Path");
    }

    #[test]
    fn normalize_strips_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/a/b/").unwrap(),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn normalize_sorts_query_params() {
        let normalized = normalize_url("https://example.com/a?b=2&a=1").unwrap();
        assert_eq!(normalized, "https://example.com/a?a=1&b=2");
    }

    #[test]
    fn normalize_drops_fragment() {
        assert_eq!(
            normalize_url("https://example.com/a#section").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let urls = [
            "https://Example.com/a/b/?z=9&a=1#frag",
            "http://EXAMPLE.COM",
            "https://example.com/path/",
        ];
        for u in urls {
            let once = normalize_url(u).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn content_hash_is_case_and_whitespace_insensitive() {
        let a = content_hash("  Title ", " Snippet text ");
        let b = content_hash("title", "snippet text");
        assert_eq!(a, b);
    }

    #[test]
    fn extract_domain_returns_host() {
        let normalized = normalize_url("https://example.com/a").unwrap();
        assert_eq!(extract_domain(&normalized), "example.com");
    }
}
