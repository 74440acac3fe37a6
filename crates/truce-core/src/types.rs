//! The claim adjudication data model: Claim, Evidence, and the panel types that
//! flow between the components in this workspace.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::normalize::{content_hash, normalize_url};

/// Maximum number of [`PanelResult`]s retained on a [`Claim`]; older entries are
/// evicted from the front as new ones are appended.
pub const MAX_PANEL_HISTORY: usize = 5;

/// An optional start/end bound used to filter [`Evidence`] by publication date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive lower bound; `None` means unbounded.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound; `None` means unbounded.
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Construct a window, rejecting an inverted range.
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::InvertedTimeWindow {
                    start: s.to_rfc3339(),
                    end: e.to_rfc3339(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Whether `timestamp` passes this window. Evidence with no timestamp
    /// always passes.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        let Some(ts) = timestamp else {
            return true;
        };
        if let Some(start) = self.start {
            if ts < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if ts > end {
                return false;
            }
        }
        true
    }

    fn token(ts: Option<DateTime<Utc>>) -> String {
        ts.map(|t| t.to_rfc3339()).unwrap_or_else(|| "null".to_string())
    }

    /// Deterministic token used by the verification cache key (§4.C8).
    pub fn cache_token(&self) -> String {
        format!("{}|{}", Self::token(self.start), Self::token(self.end))
    }
}

/// A search result before hydration (dedup / content-hash / retrieval metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSource {
    /// Headline as reported by the search provider or page.
    pub title: Option<String>,
    /// Original, unnormalized URL.
    pub url: String,
    /// Short descriptive snippet.
    pub snippet: String,
    /// Publisher / site name, if known.
    pub publisher: String,
    /// Publication timestamp, if known.
    pub published_at: Option<DateTime<Utc>>,
    /// Registrable domain, if already known; otherwise derived during hydration.
    pub domain: Option<String>,
    /// The gather strategy tag that produced this source ("direct", "academic", ...).
    pub strategy: String,
}

/// A [`RawSource`] hydrated with dedup/addressing metadata by
/// `deduplicate_sources` (§4.C1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydratedSource {
    /// The underlying raw source.
    pub source: RawSource,
    /// Canonicalized URL used for deduplication.
    pub normalized_url: String,
    /// Registrable domain extracted from the normalized URL.
    pub domain: String,
    /// SHA-256 hex digest over lowercased trimmed `title || snippet`.
    pub content_hash: String,
    /// When this source was hydrated.
    pub retrieved_at: DateTime<Utc>,
}

/// Evidence backing a claim: a single web source plus addressing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// Stable identity, referenced by citations.
    pub id: Uuid,
    /// Original URL as retrieved.
    pub url: String,
    /// Canonicalized URL (scheme + lowercased host + path w/o trailing slash +
    /// sorted query, fragment dropped). Always present after construction.
    pub normalized_url: String,
    /// SHA-256 hex digest over lowercased trimmed `title || snippet`. Always
    /// present after construction.
    pub content_hash: String,
    /// Publisher / site name.
    pub publisher: String,
    /// Registrable domain.
    pub domain: String,
    /// Page title, if known.
    pub title: Option<String>,
    /// Short descriptive snippet, clamped to 1000 characters.
    pub snippet: String,
    /// Publication timestamp, if known.
    pub published_at: Option<DateTime<Utc>>,
    /// When this evidence was retrieved by the gathering component.
    pub retrieved_at: DateTime<Utc>,
    /// Free-form tag naming the gathering source (e.g. `"explorer_agent_research"`).
    pub provenance: String,
}

impl Evidence {
    /// Build a new piece of evidence, computing `normalized_url` and
    /// `content_hash` so they are always present (§3 invariant).
    pub fn new(
        url: impl Into<String>,
        publisher: impl Into<String>,
        title: Option<String>,
        snippet: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
        provenance: impl Into<String>,
    ) -> Result<Self> {
        let url = url.into();
        let mut snippet = snippet.into();
        if snippet.len() > 1000 {
            let mut end = 1000;
            while !snippet.is_char_boundary(end) {
                end -= 1;
            }
            snippet.truncate(end);
        }
        let normalized_url = normalize_url(&url)
            .map_err(|e| Error::InvalidEvidence(format!("bad url {url}: {e}")))?;
        let domain = crate::normalize::extract_domain(&normalized_url);
        let content_hash = content_hash(title.as_deref().unwrap_or(""), &snippet);
        Ok(Self {
            id: Uuid::new_v4(),
            url,
            normalized_url,
            content_hash,
            publisher: publisher.into(),
            domain,
            title,
            snippet,
            published_at,
            retrieved_at: Utc::now(),
            provenance: provenance.into(),
        })
    }
}

/// A character range within an argument's display text pointing at an
/// [`Evidence`] id, produced by the citation extractor (C10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationLink {
    /// Byte offset of the enclosing sentence's start within the display text.
    pub start: usize,
    /// Byte offset of the marker's start within the display text (end of range).
    pub end: usize,
    /// The cited evidence id.
    pub evidence_id: Uuid,
    /// The enclosing sentence text.
    pub text: String,
}

/// One side (approval or refusal) of a model's dual-sided verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentWithEvidence {
    /// Argument prose, clamped to the 50-2000 character range.
    pub argument: String,
    /// Evidence ids cited by this argument, deduplicated, order-preserving.
    pub evidence_ids: Vec<Uuid>,
    /// Citation markers extracted from `argument`.
    pub citations: Vec<CitationLink>,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ArgumentWithEvidence {
    /// A placeholder argument used on provider failure (§3: `failed=true`
    /// implies both arguments carry confidence 0.0 and placeholder text).
    pub fn placeholder(reason: &str) -> Self {
        let mut text = format!(
            "This argument could not be produced because the provider call failed: {reason}."
        );
        while text.len() < 50 {
            text.push_str(" (no further detail available)");
        }
        Self {
            argument: text,
            evidence_ids: Vec::new(),
            citations: Vec::new(),
            confidence: 0.0,
        }
    }
}

/// The four-way verdict type used by [`VerificationRecord`], derived from a
/// claim's most recent model assessments by majority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictType {
    /// Majority of model assessments support the claim.
    Supports,
    /// Majority of model assessments refute the claim.
    Refutes,
    /// Supports/refutes tied, with at least one assessment.
    Mixed,
    /// No assessments, or no majority either way.
    Uncertain,
}

/// A single model's legacy single-sided assessment, projected from a
/// [`PanelResult`] for callers that still want the coarser shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAssessment {
    /// Stable identity.
    pub id: Uuid,
    /// Model name (without provider prefix).
    pub model_name: String,
    /// Coarse verdict derived from which side had higher confidence.
    pub verdict: VerdictType,
    /// The winning side's confidence.
    pub confidence: f64,
    /// Evidence ids cited by the winning side.
    pub citations: Vec<Uuid>,
    /// The winning side's argument text.
    pub rationale: String,
    /// When this assessment was produced.
    pub created_at: DateTime<Utc>,
}

/// The discrete, panel-level verdict derived by the aggregator (C7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PanelVerdict {
    /// Support clearly outweighs refutation.
    True,
    /// Refutation clearly outweighs support.
    False,
    /// Support and refutation are close but not negligible.
    Mixed,
    /// Support and refutation are nearly balanced or too thin to call.
    Unknown,
}

/// One model's dual-sided verdict within a [`PanelResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelModelVerdict {
    /// `provider:model`, e.g. `"openai:gpt-4o"`.
    pub provider_id: String,
    /// Bare model name, e.g. `"gpt-4o"`.
    pub model_name: String,
    /// The side arguing the claim is true.
    pub approval_argument: ArgumentWithEvidence,
    /// The side arguing the claim is false.
    pub refusal_argument: ArgumentWithEvidence,
    /// The raw, unparsed provider payload, kept for auditing.
    pub raw_payload: serde_json::Value,
    /// Whether this model's invocation failed outright.
    pub failed: bool,
    /// The failure's message, if `failed`.
    pub error: Option<String>,
}

impl PanelModelVerdict {
    /// Project this verdict down to the legacy [`ModelAssessment`] shape,
    /// choosing the higher-confidence side as the winning verdict.
    pub fn to_model_assessment(&self) -> ModelAssessment {
        let (verdict, confidence, argument, evidence_ids) =
            if self.failed {
                (VerdictType::Uncertain, 0.0, self.approval_argument.argument.clone(), Vec::new())
            } else if (self.approval_argument.confidence - self.refusal_argument.confidence).abs()
                < f64::EPSILON
            {
                (VerdictType::Mixed, self.approval_argument.confidence, self.approval_argument.argument.clone(), self.approval_argument.evidence_ids.clone())
            } else if self.approval_argument.confidence > self.refusal_argument.confidence {
                (VerdictType::Supports, self.approval_argument.confidence, self.approval_argument.argument.clone(), self.approval_argument.evidence_ids.clone())
            } else {
                (VerdictType::Refutes, self.refusal_argument.confidence, self.refusal_argument.argument.clone(), self.refusal_argument.evidence_ids.clone())
            };
        ModelAssessment {
            id: Uuid::new_v4(),
            model_name: self.model_name.clone(),
            verdict,
            confidence,
            citations: evidence_ids,
            rationale: argument,
            created_at: Utc::now(),
        }
    }
}

/// Panel-level aggregate produced by C7.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PanelSummary {
    /// Mean normalized support confidence across non-failed models.
    pub support_confidence: f64,
    /// Mean normalized refute confidence across non-failed models.
    pub refute_confidence: f64,
    /// Count of non-failed models.
    pub model_count: usize,
    /// Discrete verdict derived from the confidence delta.
    pub verdict: PanelVerdict,
}

/// The full result of one panel run: the prompt sent, every model's verdict,
/// and the aggregate summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelResult {
    /// The normalized prompt payload sent to every adapter (`truce.panel.v1`).
    pub prompt: serde_json::Value,
    /// Per-model verdicts, in model order.
    pub verdicts: Vec<PanelModelVerdict>,
    /// The aggregated summary.
    pub summary: PanelSummary,
    /// When this panel run completed.
    pub generated_at: DateTime<Utc>,
}

/// A claim to be adjudicated: the root aggregate owning its evidence,
/// assessments, and panel history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Stable identity.
    pub id: Uuid,
    /// Free text, 10-500 characters.
    pub text: String,
    /// Topic, 3-100 characters.
    pub topic: String,
    /// Entity tags (e.g. Wikidata QIDs).
    pub entities: Vec<String>,
    /// Ordered, deduplicated evidence.
    pub evidence: Vec<Evidence>,
    /// Legacy single-sided assessments, appended alongside panel results.
    pub model_assessments: Vec<ModelAssessment>,
    /// Most recent panel results, oldest-trimmed at [`MAX_PANEL_HISTORY`].
    pub panel_results: VecDeque<PanelResult>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Construct a new claim, validating text/topic length (§3).
    pub fn new(
        text: impl Into<String>,
        topic: impl Into<String>,
        entities: Vec<String>,
    ) -> Result<Self> {
        let text = text.into();
        let topic = topic.into();
        if !(10..=500).contains(&text.chars().count()) {
            return Err(Error::InvalidClaim(format!(
                "claim text must be 10-500 chars, got {}",
                text.chars().count()
            )));
        }
        if !(3..=100).contains(&topic.chars().count()) {
            return Err(Error::InvalidClaim(format!(
                "claim topic must be 3-100 chars, got {}",
                topic.chars().count()
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            text,
            topic,
            entities,
            evidence: Vec::new(),
            model_assessments: Vec::new(),
            panel_results: VecDeque::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Append evidence, deduplicating by normalized URL and content hash
    /// (§3 invariant: "Evidence appears at most once").
    pub fn add_evidence(&mut self, candidate: Evidence) -> bool {
        let exists = self.evidence.iter().any(|e| {
            e.normalized_url == candidate.normalized_url || e.content_hash == candidate.content_hash
        });
        if exists {
            return false;
        }
        self.evidence.push(candidate);
        self.updated_at = Utc::now();
        true
    }

    /// Append a panel result, evicting the oldest once history exceeds
    /// [`MAX_PANEL_HISTORY`] (§3: "history of PanelResult (at most the last 5)").
    pub fn push_panel_result(&mut self, result: PanelResult) {
        for verdict in &result.verdicts {
            self.model_assessments.push(verdict.to_model_assessment());
        }
        self.panel_results.push_back(result);
        while self.panel_results.len() > MAX_PANEL_HISTORY {
            self.panel_results.pop_front();
        }
        self.updated_at = Utc::now();
    }
}

/// An immutable cache record produced by a verification (§4.C8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Stable identity for this verification.
    pub id: Uuid,
    /// A stable slug identifying the claim (e.g. the claim id as a string).
    pub claim_slug: String,
    /// The derived legacy verdict.
    pub verdict: VerdictType,
    /// Providers used to produce this record.
    pub providers: Vec<String>,
    /// Evidence ids considered.
    pub evidence_ids: Vec<Uuid>,
    /// Opaque digest over the considered evidence (§4.C8 `sources_hash`).
    pub sources_hash: String,
    /// The time window used.
    pub time_window: TimeWindow,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl VerificationRecord {
    /// Derive the legacy verdict by majority vote over the claim's most
    /// recent assessments (§4.C8): SUPPORTS if supports>refutes, REFUTES if
    /// refutes>supports, MIXED if tied and >0, else UNCERTAIN.
    pub fn derive_verdict(assessments: &[ModelAssessment]) -> VerdictType {
        let supports = assessments.iter().filter(|a| a.verdict == VerdictType::Supports).count();
        let refutes = assessments.iter().filter(|a| a.verdict == VerdictType::Refutes).count();
        match supports.cmp(&refutes) {
            std::cmp::Ordering::Greater => VerdictType::Supports,
            std::cmp::Ordering::Less => VerdictType::Refutes,
            std::cmp::Ordering::Equal if supports > 0 => VerdictType::Mixed,
            std::cmp::Ordering::Equal => VerdictType::Uncertain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_rejects_short_text() {
        assert!(Claim::new("short", "a topic", vec![]).is_err());
    }

    #[test]
    fn claim_rejects_short_topic() {
        assert!(Claim::new("a valid claim text here", "ab", vec![]).is_err());
    }

    #[test]
    fn claim_dedups_evidence_by_normalized_url() {
        let mut claim = Claim::new("a valid claim text here", "a topic", vec![]).unwrap();
        let e1 = Evidence::new("https://Example.com/a/", "pub", None, "snippet one", None, "test").unwrap();
        let e2 = Evidence::new("https://example.com/a", "pub", None, "snippet two", None, "test").unwrap();
        assert!(claim.add_evidence(e1));
        assert!(!claim.add_evidence(e2));
        assert_eq!(claim.evidence.len(), 1);
    }

    #[test]
    fn panel_history_trims_to_five() {
        let mut claim = Claim::new("a valid claim text here", "a topic", vec![]).unwrap();
        for i in 0..7 {
            let summary = PanelSummary {
                support_confidence: 0.5,
                refute_confidence: 0.5,
                model_count: 0,
                verdict: PanelVerdict::Unknown,
            };
            claim.push_panel_result(PanelResult {
                prompt: serde_json::json!({ "i": i }),
                verdicts: vec![],
                summary,
                generated_at: Utc::now(),
            });
        }
        assert_eq!(claim.panel_results.len(), MAX_PANEL_HISTORY);
    }

    #[test]
    fn time_window_rejects_inversion() {
        let start = Utc::now();
        let end = start - chrono::Duration::days(1);
        assert!(TimeWindow::new(Some(start), Some(end)).is_err());
    }

    #[test]
    fn time_window_null_timestamp_always_passes() {
        let window = TimeWindow::new(Some(Utc::now()), Some(Utc::now())).unwrap();
        assert!(window.contains(None));
    }

    #[test]
    fn derive_verdict_majority() {
        let a = |v: VerdictType| ModelAssessment {
            id: Uuid::new_v4(),
            model_name: "m".into(),
            verdict: v,
            confidence: 0.5,
            citations: vec![],
            rationale: "x".repeat(60),
            created_at: Utc::now(),
        };
        assert_eq!(
            VerificationRecord::derive_verdict(&[a(VerdictType::Supports), a(VerdictType::Supports), a(VerdictType::Refutes)]),
            VerdictType::Supports
        );
        assert_eq!(
            VerificationRecord::derive_verdict(&[a(VerdictType::Supports), a(VerdictType::Refutes)]),
            VerdictType::Mixed
        );
        assert_eq!(VerificationRecord::derive_verdict(&[]), VerdictType::Uncertain);
    }
}
