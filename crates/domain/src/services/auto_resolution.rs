//! Auto-resolution policy for AI-analyzed photos.
//!
//! The policy is deliberately asymmetric. A reject suggestion resolves at
//! any confidence, while an approve suggestion only resolves at or above
//! [`AUTO_APPROVE_THRESHOLD`]. Everything else, including analysis
//! failures, stays in the queue for a human.

use crate::models::{ModerationAnalysis, ModerationDecision};

/// Minimum confidence at which an approve suggestion resolves without a
/// human look.
pub const AUTO_APPROVE_THRESHOLD: f32 = 0.90;

/// What the policy decided for one analyzed entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoOutcome {
    /// Resolve the photo now with this decision and audit reason.
    Resolve {
        decision: ModerationDecision,
        reason: String,
    },
    /// Leave the entry pending for manual review.
    Pending,
}

impl AutoOutcome {
    pub fn is_resolve(&self) -> bool {
        matches!(self, AutoOutcome::Resolve { .. })
    }
}

/// Apply the auto-resolution policy to one analysis result.
pub fn decide(analysis: &ModerationAnalysis) -> AutoOutcome {
    if analysis.is_failure() {
        return AutoOutcome::Pending;
    }
    match analysis.suggestion {
        Some(ModerationDecision::Reject) => AutoOutcome::Resolve {
            decision: ModerationDecision::Reject,
            reason: audit_reason("rejected", analysis),
        },
        Some(ModerationDecision::Approve) if analysis.confidence >= AUTO_APPROVE_THRESHOLD => {
            AutoOutcome::Resolve {
                decision: ModerationDecision::Approve,
                reason: audit_reason("approved", analysis),
            }
        }
        _ => AutoOutcome::Pending,
    }
}

fn audit_reason(verb: &str, analysis: &ModerationAnalysis) -> String {
    format!(
        "Auto-{} by AI ({:.0}% confidence): {}",
        verb,
        analysis.confidence * 100.0,
        analysis.reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(decision: ModerationDecision, confidence: f32) -> ModerationAnalysis {
        ModerationAnalysis::verdict(decision, confidence, "content check".to_string())
    }

    #[test]
    fn test_reject_resolves_at_any_confidence() {
        let outcome = decide(&verdict(ModerationDecision::Reject, 0.12));
        match outcome {
            AutoOutcome::Resolve { decision, reason } => {
                assert_eq!(decision, ModerationDecision::Reject);
                assert!(reason.contains("Auto-rejected"));
                assert!(reason.contains("12% confidence"));
            }
            AutoOutcome::Pending => panic!("reject must resolve"),
        }
    }

    #[test]
    fn test_high_confidence_approve_resolves() {
        let outcome = decide(&verdict(ModerationDecision::Approve, 0.95));
        match outcome {
            AutoOutcome::Resolve { decision, reason } => {
                assert_eq!(decision, ModerationDecision::Approve);
                assert!(reason.contains("Auto-approved"));
                assert!(reason.contains("95% confidence"));
            }
            AutoOutcome::Pending => panic!("high-confidence approve must resolve"),
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(decide(&verdict(ModerationDecision::Approve, 0.90)).is_resolve());
        assert_eq!(
            decide(&verdict(ModerationDecision::Approve, 0.899)),
            AutoOutcome::Pending
        );
    }

    #[test]
    fn test_failure_stays_pending() {
        let analysis = ModerationAnalysis::failure("model returned malformed output");
        assert_eq!(decide(&analysis), AutoOutcome::Pending);
    }

    #[test]
    fn test_missing_suggestion_stays_pending() {
        let analysis = ModerationAnalysis {
            suggestion: None,
            confidence: 0.99,
            reason: "no verdict".to_string(),
            error_message: None,
        };
        assert_eq!(decide(&analysis), AutoOutcome::Pending);
    }
}
