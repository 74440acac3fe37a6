//! API-key environment variable lookups, one per supported provider. A
//! missing variable is not an error here — callers decide whether to fall
//! back to a [`crate::stub::StubAdapter`] or skip the model entirely (§9
//! DESIGN NOTES: panel composition is driven by which credentials are set).

/// Read `OPENAI_API_KEY`.
pub fn openai_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty())
}

/// Read `XAI_API_KEY`.
pub fn xai_api_key() -> Option<String> {
    std::env::var("XAI_API_KEY").ok().filter(|s| !s.is_empty())
}

/// Read `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
pub fn gemini_api_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
        .filter(|s| !s.is_empty())
}

/// Read `ANTHROPIC_API_KEY`.
pub fn anthropic_api_key() -> Option<String> {
    std::env::var("ANTHROPIC_API_KEY").ok().filter(|s| !s.is_empty())
}
