//! Citation extraction (C10): scans argument text for inline evidence-id
//! markers, emits [`CitationLink`]s, and produces a cleaned display text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::types::CitationLink;

const UUID_PATTERN: &str =
    r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\((?:evidence_id:\s*)?({UUID_PATTERN})\)")).unwrap()
});

/// Scan `argument` for `(uuid)` / `(evidence_id: uuid)` markers resolvable via
/// `evidence_lookup`, returning citation links (indexed into the *cleaned*
/// text) and the cleaned display text with markers stripped and whitespace
/// collapsed.
pub fn extract_citations(
    argument: &str,
    evidence_lookup: &HashMap<String, Uuid>,
) -> (Vec<CitationLink>, String) {
    let mut citations = Vec::new();
    let mut cleaned = String::with_capacity(argument.len());
    let mut last_copy_end = 0usize;

    for caps in MARKER.captures_iter(argument) {
        let whole = caps.get(0).unwrap();
        let uuid_str = caps.get(1).unwrap().as_str();
        let Some(&evidence_id) = evidence_lookup.get(uuid_str) else {
            continue;
        };

        // Copy the untouched text since the previous marker, then find the
        // sentence start by scanning back over everything copied so far.
        let segment = &argument[last_copy_end..whole.start()];
        cleaned.push_str(segment);

        let sentence_start = find_sentence_start(&cleaned, cleaned.len());
        let text = cleaned[sentence_start..].trim().to_string();

        citations.push(CitationLink {
            start: sentence_start,
            end: cleaned.len(),
            evidence_id,
            text,
        });

        last_copy_end = whole.end();
    }
    cleaned.push_str(&argument[last_copy_end..]);

    let collapsed = collapse_whitespace(&cleaned);
    (citations, collapsed)
}

/// Scan backward from `from` for a sentence boundary (`.`/`!`/`?` followed by
/// whitespace), guarding against decimals and abbreviations by requiring the
/// character preceding the punctuation not be a digit.
fn find_sentence_start(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = from;
    while i > 0 {
        i -= 1;
        let c = bytes[i] as char;
        if (c == '.' || c == '!' || c == '?')
            && bytes.get(i + 1).map(|b| *b as char).is_some_and(|n| n.is_whitespace())
            && (i == 0 || !(bytes[i - 1] as char).is_ascii_digit())
        {
            return i + 2;
        }
    }
    0
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_uuid_marker() {
        let id = Uuid::new_v4();
        let mut lookup = HashMap::new();
        lookup.insert(id.to_string(), id);
        let text = format!("Crime rose sharply last year ({id}). That is notable.");
        let (citations, cleaned) = extract_citations(&text, &lookup);
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].evidence_id, id);
        assert!(citations[0].text.contains("Crime rose sharply"));
        assert!(!cleaned.contains(&id.to_string()));
    }

    #[test]
    fn extracts_evidence_id_prefixed_marker() {
        let id = Uuid::new_v4();
        let mut lookup = HashMap::new();
        lookup.insert(id.to_string(), id);
        let text = format!("A claim (evidence_id: {id}) follows.");
        let (citations, _) = extract_citations(&text, &lookup);
        assert_eq!(citations.len(), 1);
    }

    #[test]
    fn drops_unresolvable_markers() {
        let unknown = Uuid::new_v4();
        let lookup = HashMap::new();
        let text = format!("Unverified claim ({unknown}).");
        let (citations, cleaned) = extract_citations(&text, &lookup);
        assert!(citations.is_empty());
        assert!(cleaned.contains(&unknown.to_string()));
    }

    #[test]
    fn collapses_whitespace_after_stripping() {
        let id = Uuid::new_v4();
        let mut lookup = HashMap::new();
        lookup.insert(id.to_string(), id);
        let text = format!("Sentence one. Sentence   two ({id})   has   gaps.");
        let (_, cleaned) = extract_citations(&text, &lookup);
        assert!(!cleaned.contains("   "));
    }

    #[test]
    fn citation_text_excludes_earlier_sentences() {
        let id = Uuid::new_v4();
        let mut lookup = HashMap::new();
        lookup.insert(id.to_string(), id);
        let text = format!(
            "Historical rates were stable for decades. Recent data shows an increase ({id}). Experts disagree."
        );
        let (citations, _) = extract_citations(&text, &lookup);
        assert_eq!(citations.len(), 1);
        assert!(!citations[0].text.contains("Historical rates"));
        assert!(citations[0].text.contains("Recent data shows an increase"));
    }

    #[test]
    fn second_marker_scopes_to_its_own_sentence() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut lookup = HashMap::new();
        lookup.insert(first.to_string(), first);
        lookup.insert(second.to_string(), second);
        let text = format!(
            "Rates rose last quarter ({first}). A separate report shows a decline ({second}). Analysts are split."
        );
        let (citations, _) = extract_citations(&text, &lookup);
        assert_eq!(citations.len(), 2);
        assert!(citations[0].text.contains("Rates rose last quarter"));
        assert!(!citations[1].text.contains("Rates rose last quarter"));
        assert!(citations[1].text.contains("A separate report shows a decline"));
    }
}
