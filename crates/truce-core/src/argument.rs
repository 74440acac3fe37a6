//! Argument text normalization shared by the provider adapter layer (§4.C5
//! step 3): confidence clamping, smart truncation, and deterministic padding.

const FILLER_SENTENCE: &str =
    " Additional supporting detail was not provided by the model for this argument.";

/// Clamp a confidence value into `[0, 1]`.
pub fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Truncate `text` to at most `limit` characters at a sentence boundary when
/// one exists at or after 70% of the limit; otherwise at a word boundary;
/// otherwise a hard cut with a trailing ellipsis.
pub fn smart_truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let cut = &chars[..limit];
    let min_sentence_pos = (limit as f64 * 0.7) as usize;

    if let Some(pos) = cut
        .iter()
        .enumerate()
        .rev()
        .find(|(i, c)| *i >= min_sentence_pos && matches!(c, '.' | '!' | '?'))
        .map(|(i, _)| i)
    {
        return chars[..=pos].iter().collect();
    }

    if let Some(pos) = cut.iter().rposition(|c| c.is_whitespace()) {
        let mut truncated: String = chars[..pos].iter().collect();
        truncated.push_str("...");
        return truncated;
    }

    let mut truncated: String = cut.iter().collect();
    truncated.push_str("...");
    truncated
}

/// Pad `text` with a deterministic filler sentence until it reaches at least
/// `min_len` characters.
pub fn pad_to_minimum(text: &str, min_len: usize) -> String {
    let mut out = text.to_string();
    while out.chars().count() < min_len {
        out.push_str(FILLER_SENTENCE);
    }
    out
}

/// Apply both truncation and padding to bring `text` within `[min_len, max_len]`.
pub fn normalize_argument_length(text: &str, min_len: usize, max_len: usize) -> String {
    let truncated = smart_truncate(text, max_len);
    pad_to_minimum(&truncated, min_len)
}
