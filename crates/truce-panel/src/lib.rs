//! Panel Orchestrator (C6): turns a claim and a model lineup into a
//! dual-sided, cached verification via agentic research, sequential model
//! evaluation, and deterministic aggregation.

pub mod error;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod service;

pub use error::{Error, Result};
pub use models::{build_adapter, build_adapters, default_panel_models, PanelModelSpec};
pub use orchestrator::{run_panel_evaluation, PanelRunContext};
pub use prompt::{build_evidence_lookup, build_prompt, PROMPT_SCHEMA};
pub use service::{cancel_session, subscribe_progress, verify_claim};
