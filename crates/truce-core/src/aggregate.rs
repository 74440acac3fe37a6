//! Aggregator & Reconciler (C7): fuses per-model dual-sided verdicts into a
//! panel-level summary, and reconciles complementary claims.

use crate::direction::{infer_direction, neutralize_direction, Direction};
use crate::types::{PanelModelVerdict, PanelSummary, PanelVerdict};

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Fuse per-model verdicts into a [`PanelSummary`] (§4.C7).
pub fn aggregate_panel(verdicts: &[PanelModelVerdict]) -> PanelSummary {
    let successful: Vec<&PanelModelVerdict> = verdicts.iter().filter(|v| !v.failed).collect();

    if successful.is_empty() {
        return PanelSummary {
            support_confidence: 0.0,
            refute_confidence: 0.0,
            model_count: 0,
            verdict: PanelVerdict::Unknown,
        };
    }

    let mut normalized_approvals = Vec::with_capacity(successful.len());
    let mut normalized_refusals = Vec::with_capacity(successful.len());
    for verdict in &successful {
        let a = verdict.approval_argument.confidence;
        let r = verdict.refusal_argument.confidence;
        let total = a + r;
        if total <= 0.0 {
            normalized_approvals.push(0.5);
            normalized_refusals.push(0.5);
        } else {
            normalized_approvals.push(a / total);
            normalized_refusals.push(r / total);
        }
    }

    let n = successful.len() as f64;
    let support_confidence = round4(normalized_approvals.iter().sum::<f64>() / n);
    let refute_confidence = round4(normalized_refusals.iter().sum::<f64>() / n);

    let verdict = derive_verdict(support_confidence, refute_confidence);

    PanelSummary {
        support_confidence,
        refute_confidence,
        model_count: successful.len(),
        verdict,
    }
}

/// Derive the discrete [`PanelVerdict`] from the support/refute confidence
/// delta (§4.C7 step 4).
pub fn derive_verdict(support: f64, refute: f64) -> PanelVerdict {
    if (support - refute).abs() < f64::EPSILON {
        return PanelVerdict::Mixed;
    }
    let delta = (support - refute).abs();
    if delta >= 0.30 {
        if support > refute {
            PanelVerdict::True
        } else {
            PanelVerdict::False
        }
    } else if delta >= 0.10 {
        PanelVerdict::Mixed
    } else {
        PanelVerdict::Unknown
    }
}

/// Whether two claims are complementary (§4.C7 reconciliation): their
/// neutralized-text token sets overlap substantially and their inferred
/// directions differ.
pub fn are_complementary(claim_a: &str, claim_b: &str) -> bool {
    let neutral_a = neutralize_direction(claim_a);
    let neutral_b = neutralize_direction(claim_b);

    let tokens_a: std::collections::HashSet<&str> = neutral_a.split_whitespace().collect();
    let tokens_b: std::collections::HashSet<&str> = neutral_b.split_whitespace().collect();
    let overlap = tokens_a.intersection(&tokens_b).count();
    let threshold = std::cmp::max(2, (0.6 * tokens_a.len().min(tokens_b.len()) as f64) as usize);
    if overlap < threshold {
        return false;
    }

    match (infer_direction(claim_a), infer_direction(claim_b)) {
        (Some(Direction::Up), Some(Direction::Down)) | (Some(Direction::Down), Some(Direction::Up)) => true,
        _ => false,
    }
}

/// Reconcile a pair of complementary claims' summaries: if both currently
/// show `support > 0.6`, invert the weaker-support one (§4.C7). Returns the
/// (possibly-flipped) summaries as `(a, b)`.
pub fn reconcile(a: PanelSummary, b: PanelSummary) -> (PanelSummary, PanelSummary) {
    if a.support_confidence > 0.6 && b.support_confidence > 0.6 {
        if a.support_confidence <= b.support_confidence {
            return (flip(a), b);
        }
        return (a, flip(b));
    }
    (a, b)
}

fn flip(summary: PanelSummary) -> PanelSummary {
    let verdict = match summary.verdict {
        PanelVerdict::True => PanelVerdict::False,
        PanelVerdict::False => PanelVerdict::True,
        other => other,
    };
    PanelSummary {
        support_confidence: summary.refute_confidence,
        refute_confidence: summary.support_confidence,
        model_count: summary.model_count,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArgumentWithEvidence;

    fn verdict(approval: f64, refusal: f64, failed: bool) -> PanelModelVerdict {
        PanelModelVerdict {
            provider_id: "openai:gpt-4o".into(),
            model_name: "gpt-4o".into(),
            approval_argument: ArgumentWithEvidence {
                argument: "x".repeat(60),
                evidence_ids: vec![],
                citations: vec![],
                confidence: approval,
            },
            refusal_argument: ArgumentWithEvidence {
                argument: "y".repeat(60),
                evidence_ids: vec![],
                citations: vec![],
                confidence: refusal,
            },
            raw_payload: serde_json::json!({}),
            failed,
            error: None,
        }
    }

    #[test]
    fn s2_balanced_yields_mixed() {
        let verdicts = vec![verdict(0.5, 0.5, false), verdict(0.5, 0.5, false)];
        let summary = aggregate_panel(&verdicts);
        assert_eq!(summary.support_confidence, 0.5);
        assert_eq!(summary.refute_confidence, 0.5);
        assert_eq!(summary.verdict, PanelVerdict::Mixed);
    }

    #[test]
    fn s3_strong_support_yields_true() {
        let verdicts = vec![verdict(0.85, 0.15, false), verdict(0.90, 0.10, false)];
        let summary = aggregate_panel(&verdicts);
        assert!((summary.support_confidence - 0.875).abs() < 1e-9);
        assert!((summary.refute_confidence - 0.125).abs() < 1e-9);
        assert_eq!(summary.verdict, PanelVerdict::True);
    }

    #[test]
    fn all_failed_yields_unknown_zero_count() {
        let verdicts = vec![verdict(0.8, 0.2, true), verdict(0.9, 0.1, true)];
        let summary = aggregate_panel(&verdicts);
        assert_eq!(summary.model_count, 0);
        assert_eq!(summary.support_confidence, 0.0);
        assert_eq!(summary.verdict, PanelVerdict::Unknown);
    }

    #[test]
    fn failed_verdicts_excluded_from_mean() {
        let verdicts = vec![verdict(0.9, 0.1, false), verdict(0.1, 0.9, true)];
        let summary = aggregate_panel(&verdicts);
        assert_eq!(summary.model_count, 1);
        assert!((summary.support_confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn zero_sum_confidences_normalize_to_half() {
        let verdicts = vec![verdict(0.0, 0.0, false)];
        let summary = aggregate_panel(&verdicts);
        assert_eq!(summary.support_confidence, 0.5);
        assert_eq!(summary.refute_confidence, 0.5);
    }

    #[test]
    fn derive_verdict_thresholds() {
        assert_eq!(derive_verdict(0.9, 0.1), PanelVerdict::True);
        assert_eq!(derive_verdict(0.1, 0.9), PanelVerdict::False);
        assert_eq!(derive_verdict(0.6, 0.4), PanelVerdict::Mixed);
        assert_eq!(derive_verdict(0.52, 0.48), PanelVerdict::Unknown);
        assert_eq!(derive_verdict(0.5, 0.5), PanelVerdict::Mixed);
    }

    #[test]
    fn reconciliation_flips_weaker_claim() {
        let strong = PanelSummary { support_confidence: 0.9, refute_confidence: 0.1, model_count: 3, verdict: PanelVerdict::True };
        let weak = PanelSummary { support_confidence: 0.7, refute_confidence: 0.3, model_count: 3, verdict: PanelVerdict::True };
        let (a, b) = reconcile(strong, weak);
        assert_eq!(a.verdict, PanelVerdict::True);
        assert_eq!(b.verdict, PanelVerdict::False);
        assert_eq!(b.support_confidence, 0.3);
    }

    #[test]
    fn reconciliation_noop_when_not_both_strong() {
        let a = PanelSummary { support_confidence: 0.9, refute_confidence: 0.1, model_count: 3, verdict: PanelVerdict::True };
        let b = PanelSummary { support_confidence: 0.4, refute_confidence: 0.6, model_count: 3, verdict: PanelVerdict::False };
        let (ra, rb) = reconcile(a, b);
        assert_eq!(ra.verdict, PanelVerdict::True);
        assert_eq!(rb.verdict, PanelVerdict::False);
    }

    #[test]
    fn complementary_claims_detected() {
        assert!(are_complementary(
            "Violent crime in Canada is rising quickly across provinces",
            "Violent crime in Canada is falling quickly across provinces"
        ));
    }

    #[test]
    fn unrelated_claims_not_complementary() {
        assert!(!are_complementary(
            "Violent crime in Canada is rising",
            "Coffee prices in Brazil are falling"
        ));
    }
}
