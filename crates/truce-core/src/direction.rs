//! Directional lexical inference: a heuristic (not a contract, per §9 DESIGN
//! NOTES) used by direction neutralization (C6), stub-payload synthesis (C5),
//! and complementary-claim reconciliation (C7).

use std::sync::LazyLock;

use regex::Regex;

/// The inferred directional lean of a claim or evidence body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Lexical cues suggest an increase ("rising", "up", ...).
    Up,
    /// Lexical cues suggest a decrease ("falling", "down", ...).
    Down,
}

const UP_WORDS: &[&str] = &["rise", "rising", "risen", "increase", "increasing", "increased", "up", "grew", "growing", "growth", "surge", "surging", "climb", "climbing"];
const DOWN_WORDS: &[&str] = &["fall", "falling", "fell", "decrease", "decreasing", "decreased", "down", "decline", "declining", "declined", "drop", "dropping", "dropped", "plunge", "plunging"];

fn count_hits(text: &str, words: &[&str]) -> usize {
    let lower = text.to_ascii_lowercase();
    words.iter().filter(|w| lower.contains(*w)).count()
}

/// Infer the directional lean of a single body of text via lexical cue counts.
pub fn infer_direction(text: &str) -> Option<Direction> {
    let up = count_hits(text, UP_WORDS);
    let down = count_hits(text, DOWN_WORDS);
    match up.cmp(&down) {
        std::cmp::Ordering::Greater => Some(Direction::Up),
        std::cmp::Ordering::Less => Some(Direction::Down),
        std::cmp::Ordering::Equal => None,
    }
}

/// Infer the directional lean across a set of evidence snippets by summing
/// lexical cues (§4.C5 stub payload: "Evidence direction inferred by summing
/// up/down lexical cues across snippets").
pub fn infer_evidence_direction<'a>(snippets: impl IntoIterator<Item = &'a str>) -> Option<Direction> {
    let mut up = 0usize;
    let mut down = 0usize;
    for snippet in snippets {
        up += count_hits(snippet, UP_WORDS);
        down += count_hits(snippet, DOWN_WORDS);
    }
    match up.cmp(&down) {
        std::cmp::Ordering::Greater => Some(Direction::Up),
        std::cmp::Ordering::Less => Some(Direction::Down),
        std::cmp::Ordering::Equal => None,
    }
}

static UP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(is|was|has been)\s+(rising|increasing|up)\b").unwrap());
static DOWN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(is|was)\s+(declining|falling|down)\b").unwrap());
static BARE_ADJECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(rising|increasing|declining|falling|growing|shrinking)\b").unwrap()
});

/// Strip directional modifiers from a claim's text so complementary claims
/// share the same evidence pool (§4.C6 "Direction neutralization"). Falls
/// back to the original text if neutralization shrinks it below
/// `max(10, 0.5 * original_len)` characters.
pub fn neutralize_direction(text: &str) -> String {
    let mut neutralized = UP_PATTERN.replace_all(text, "").to_string();
    neutralized = DOWN_PATTERN.replace_all(&neutralized, "").to_string();
    neutralized = BARE_ADJECTIVE.replace_all(&neutralized, "").to_string();
    neutralized = neutralized.split_whitespace().collect::<Vec<_>>().join(" ");
    neutralized = neutralized.trim().trim_end_matches(|c: char| c == '.' || c == ',').to_string();

    let original_len = text.chars().count();
    let floor = std::cmp::max(10, (original_len as f64 * 0.5) as usize);
    if neutralized.chars().count() < floor {
        text.to_string()
    } else {
        neutralized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_up_direction() {
        assert_eq!(infer_direction("Crime is rising sharply"), Some(Direction::Up));
    }

    #[test]
    fn infers_down_direction() {
        assert_eq!(infer_direction("Crime is falling sharply"), Some(Direction::Down));
    }

    #[test]
    fn no_cues_yields_none() {
        assert_eq!(infer_direction("Crime statistics were published today"), None);
    }

    #[test]
    fn neutralizes_rising_pattern() {
        let neutralized = neutralize_direction("Violent crime in Canada is rising quickly");
        assert!(!neutralized.to_lowercase().contains("rising"));
        assert!(neutralized.to_lowercase().contains("violent crime in canada"));
    }

    #[test]
    fn retains_original_when_neutralization_too_aggressive() {
        let short = "Crime is rising";
        let neutralized = neutralize_direction(short);
        // "Crime" alone would be far below the floor, so the original is kept.
        assert_eq!(neutralized, short);
    }
}
