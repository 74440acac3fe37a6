//! The default panel lineup and the credential-driven adapter factory.
//!
//! `DEFAULT_PANEL_MODELS` is plain configuration, not wired into
//! [`crate::orchestrator::run_panel_evaluation`]'s signature (§9 DESIGN NOTES
//! "Open question — model lineup": treat it as configuration, do not
//! hard-code). Callers build their own adapter list via [`build_adapters`] and
//! pass it in.

use truce_providers::{anthropic_adapter, env, gemini_adapter, openai_adapter, xai_adapter, PanelAdapter, StubAdapter};

/// One entry in a panel lineup: the provider id (`"openai"`, `"xai"`,
/// `"gemini"`, `"anthropic"`) and the bare model name requested of it.
#[derive(Debug, Clone)]
pub struct PanelModelSpec {
    /// Provider identity; selects which [`PanelAdapter`] constructor to use.
    pub provider_id: String,
    /// Bare model name passed through to the provider's API.
    pub model_name: String,
}

impl PanelModelSpec {
    /// Construct a spec for `provider_id`/`model_name`.
    pub fn new(provider_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self { provider_id: provider_id.into(), model_name: model_name.into() }
    }
}

/// The panel lineup used when no caller-specified model list is given. This
/// is a documented default, not a contract — callers are expected to
/// override it as model availability changes.
pub fn default_panel_models() -> Vec<PanelModelSpec> {
    vec![
        PanelModelSpec::new("openai", "gpt-4o"),
        PanelModelSpec::new("xai", "grok-3"),
        PanelModelSpec::new("gemini", "gemini-2.0-flash-exp"),
        PanelModelSpec::new("anthropic", "claude-sonnet-4-20250514"),
    ]
}

/// Build one adapter for `spec`, falling back to a [`StubAdapter`] when the
/// provider's API key env var is unset (§7: "Config | missing API key |
/// adapter/invocation | synthesize stub payload").
pub fn build_adapter(spec: &PanelModelSpec) -> Box<dyn PanelAdapter> {
    match spec.provider_id.as_str() {
        "openai" => match env::openai_api_key() {
            Some(key) => Box::new(openai_adapter(spec.provider_id.clone(), spec.model_name.clone(), key)),
            None => Box::new(StubAdapter::new(spec.provider_id.clone(), spec.model_name.clone())),
        },
        "xai" => match env::xai_api_key() {
            Some(key) => Box::new(xai_adapter(spec.provider_id.clone(), spec.model_name.clone(), key, None)),
            None => Box::new(StubAdapter::new(spec.provider_id.clone(), spec.model_name.clone())),
        },
        "gemini" | "google" => match env::gemini_api_key() {
            Some(key) => Box::new(gemini_adapter(spec.provider_id.clone(), spec.model_name.clone(), key)),
            None => Box::new(StubAdapter::new(spec.provider_id.clone(), spec.model_name.clone())),
        },
        "anthropic" => match env::anthropic_api_key() {
            Some(key) => Box::new(anthropic_adapter(spec.provider_id.clone(), spec.model_name.clone(), key)),
            None => Box::new(StubAdapter::new(spec.provider_id.clone(), spec.model_name.clone())),
        },
        _ => Box::new(StubAdapter::new(spec.provider_id.clone(), spec.model_name.clone())),
    }
}

/// Build one adapter per entry in `specs`, in order.
pub fn build_adapters(specs: &[PanelModelSpec]) -> Vec<Box<dyn PanelAdapter>> {
    specs.iter().map(build_adapter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_yields_stub_adapter() {
        let spec = PanelModelSpec::new("mystery-vendor", "model-x");
        let adapter = build_adapter(&spec);
        assert_eq!(adapter.provider_id(), "mystery-vendor");
    }

    #[test]
    fn default_lineup_has_four_models() {
        assert_eq!(default_panel_models().len(), 4);
    }

    #[test]
    fn missing_credentials_fall_back_to_stub() {
        std::env::remove_var("OPENAI_API_KEY");
        let spec = PanelModelSpec::new("openai", "gpt-4o");
        let adapter = build_adapter(&spec);
        assert_eq!(adapter.model_name(), "gpt-4o");
    }
}
