//! Moderation domain models.
//!
//! Queue entries are never deleted; together with the append-only action
//! log they form the audit trail for every photo that passed through
//! review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::photo::{Photo, PhotoResponse, PhotoStatus};

/// Moderator identity recorded when the policy engine resolves an item
/// during the normal analysis pass.
pub const MODERATOR_AUTO: &str = "gemini-auto";

/// Moderator identity recorded when an item is resolved by the admin
/// retry batch.
pub const MODERATOR_RETRY: &str = "gemini-retry";

/// A moderation verdict, either suggested by the AI or applied by a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approve,
    Reject,
}

impl ModerationDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            ModerationDecision::Approve => "approve",
            ModerationDecision::Reject => "reject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(ModerationDecision::Approve),
            "reject" => Some(ModerationDecision::Reject),
            _ => None,
        }
    }

    /// The photo status this decision resolves to.
    pub fn photo_status(self) -> PhotoStatus {
        match self {
            ModerationDecision::Approve => PhotoStatus::Approved,
            ModerationDecision::Reject => PhotoStatus::Rejected,
        }
    }
}

/// A moderation queue entry for one photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModerationQueueEntry {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub queued_at: DateTime<Utc>,
    pub processed: bool,
    pub gemini_suggestion: Option<ModerationDecision>,
    pub confidence_score: Option<f32>,
    pub error_message: Option<String>,
}

impl ModerationQueueEntry {
    /// Whether this entry still needs an AI analysis pass: not yet
    /// resolved and no suggestion recorded. Entries with a prior error fall
    /// in here, which is exactly what the retry batch targets.
    pub fn needs_analysis(&self) -> bool {
        !self.processed && self.gemini_suggestion.is_none()
    }
}

/// One row of the append-only moderation action log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModerationAction {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub moderator_id: String,
    pub action: ModerationDecision,
    pub reason: Option<String>,
    pub actioned_at: DateTime<Utc>,
}

/// Result of one AI analysis call. This is a value, not an error: every
/// upstream failure mode (missing key, download failure, bad output) is
/// carried in `error_message` so the orchestrator can record it on the
/// queue entry without aborting the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationAnalysis {
    pub suggestion: Option<ModerationDecision>,
    pub confidence: f32,
    pub reason: String,
    pub error_message: Option<String>,
}

impl ModerationAnalysis {
    /// A successful verdict.
    pub fn verdict(suggestion: ModerationDecision, confidence: f32, reason: String) -> Self {
        Self {
            suggestion: Some(suggestion),
            confidence: confidence.clamp(0.0, 1.0),
            reason,
            error_message: None,
        }
    }

    /// A soft failure: no suggestion, zero confidence, message for the
    /// queue entry.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            suggestion: None,
            confidence: 0.0,
            reason: message.clone(),
            error_message: Some(message),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Request body for a manual approve/reject.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ModerateRequest {
    pub action: ModerationDecision,
    #[validate(length(max = 1000, message = "reason too long"))]
    pub reason: Option<String>,
}

/// A queue entry joined with its photo, as shown to moderators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ModerationQueueItemResponse {
    pub id: Uuid,
    pub photo: PhotoResponse,
    pub queued_at: DateTime<Utc>,
    pub gemini_suggestion: Option<ModerationDecision>,
    pub confidence_score: Option<f32>,
    pub error_message: Option<String>,
}

impl ModerationQueueItemResponse {
    pub fn from_parts(entry: ModerationQueueEntry, photo: Photo) -> Self {
        Self {
            id: entry.id,
            photo: photo.into(),
            queued_at: entry.queued_at,
            gemini_suggestion: entry.gemini_suggestion,
            confidence_score: entry.confidence_score,
            error_message: entry.error_message,
        }
    }
}

/// Response for the moderation queue view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ModerationQueueResponse {
    pub items: Vec<ModerationQueueItemResponse>,
    pub total: usize,
}

/// Response for the analyze/retry batch endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisBatchResponse {
    /// Entries for which an analysis call was made.
    pub analyzed: usize,
    /// Entries auto-resolved by policy during this pass.
    pub auto_resolved: usize,
    /// Entries that recorded an error and remain pending.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(processed: bool, suggestion: Option<ModerationDecision>) -> ModerationQueueEntry {
        ModerationQueueEntry {
            id: Uuid::new_v4(),
            photo_id: Uuid::new_v4(),
            queued_at: Utc::now(),
            processed,
            gemini_suggestion: suggestion,
            confidence_score: None,
            error_message: None,
        }
    }

    #[test]
    fn test_decision_round_trip() {
        assert_eq!(
            ModerationDecision::parse("approve"),
            Some(ModerationDecision::Approve)
        );
        assert_eq!(
            ModerationDecision::parse("reject"),
            Some(ModerationDecision::Reject)
        );
        assert_eq!(ModerationDecision::parse("maybe"), None);
    }

    #[test]
    fn test_decision_maps_to_photo_status() {
        assert_eq!(
            ModerationDecision::Approve.photo_status(),
            PhotoStatus::Approved
        );
        assert_eq!(
            ModerationDecision::Reject.photo_status(),
            PhotoStatus::Rejected
        );
    }

    #[test]
    fn test_needs_analysis() {
        // Fresh entry: needs analysis.
        assert!(entry(false, None).needs_analysis());
        // Analyzed but below auto-approve threshold: suggestion present,
        // still pending, must NOT be re-analyzed by the retry batch.
        assert!(!entry(false, Some(ModerationDecision::Approve)).needs_analysis());
        // Resolved entries are done regardless of suggestion.
        assert!(!entry(true, None).needs_analysis());
        assert!(!entry(true, Some(ModerationDecision::Reject)).needs_analysis());
    }

    #[test]
    fn test_analysis_failure_shape() {
        let analysis = ModerationAnalysis::failure("storage download failed: 404");
        assert!(analysis.is_failure());
        assert_eq!(analysis.suggestion, None);
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(
            analysis.error_message.as_deref(),
            Some("storage download failed: 404")
        );
    }

    #[test]
    fn test_analysis_verdict_clamps_confidence() {
        let analysis =
            ModerationAnalysis::verdict(ModerationDecision::Approve, 1.7, "ok".to_string());
        assert_eq!(analysis.confidence, 1.0);
        assert!(!analysis.is_failure());
    }
}
