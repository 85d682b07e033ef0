//! Moderation queue and action entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::moderation::{ModerationAction, ModerationDecision, ModerationQueueEntry};

/// Database row mapping for the moderation_queues table.
#[derive(Debug, Clone, FromRow)]
pub struct ModerationQueueEntity {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub queued_at: DateTime<Utc>,
    pub processed: bool,
    pub gemini_suggestion: Option<String>,
    pub confidence_score: Option<f32>,
    pub error_message: Option<String>,
}

impl From<ModerationQueueEntity> for ModerationQueueEntry {
    fn from(entity: ModerationQueueEntity) -> Self {
        Self {
            id: entity.id,
            photo_id: entity.photo_id,
            queued_at: entity.queued_at,
            processed: entity.processed,
            gemini_suggestion: entity
                .gemini_suggestion
                .as_deref()
                .and_then(ModerationDecision::parse),
            confidence_score: entity.confidence_score,
            error_message: entity.error_message,
        }
    }
}

/// Database row mapping for the moderation_actions table.
#[derive(Debug, Clone, FromRow)]
pub struct ModerationActionEntity {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub moderator_id: String,
    pub action: String,
    pub reason: Option<String>,
    pub actioned_at: DateTime<Utc>,
}

impl From<ModerationActionEntity> for ModerationAction {
    fn from(entity: ModerationActionEntity) -> Self {
        Self {
            id: entity.id,
            photo_id: entity.photo_id,
            moderator_id: entity.moderator_id,
            // Action rows are only written through the builder, so the
            // column always holds a known value. Treat anything else as
            // a reject for safety.
            action: ModerationDecision::parse(&entity.action).unwrap_or(ModerationDecision::Reject),
            reason: entity.reason,
            actioned_at: entity.actioned_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_entity_to_domain() {
        let entity = ModerationQueueEntity {
            id: Uuid::new_v4(),
            photo_id: Uuid::new_v4(),
            queued_at: Utc::now(),
            processed: false,
            gemini_suggestion: Some("approve".to_string()),
            confidence_score: Some(0.72),
            error_message: None,
        };
        let entry: ModerationQueueEntry = entity.clone().into();

        assert_eq!(entry.photo_id, entity.photo_id);
        assert_eq!(entry.gemini_suggestion, Some(ModerationDecision::Approve));
        assert_eq!(entry.confidence_score, Some(0.72));
        assert!(!entry.processed);
    }

    #[test]
    fn test_queue_entity_unknown_suggestion_drops() {
        let entity = ModerationQueueEntity {
            id: Uuid::new_v4(),
            photo_id: Uuid::new_v4(),
            queued_at: Utc::now(),
            processed: false,
            gemini_suggestion: Some("escalate".to_string()),
            confidence_score: None,
            error_message: None,
        };
        let entry: ModerationQueueEntry = entity.into();
        assert_eq!(entry.gemini_suggestion, None);
    }

    #[test]
    fn test_action_entity_to_domain() {
        let entity = ModerationActionEntity {
            id: Uuid::new_v4(),
            photo_id: Uuid::new_v4(),
            moderator_id: "gemini-auto".to_string(),
            action: "reject".to_string(),
            reason: Some("Auto-rejected by AI (88% confidence): nudity".to_string()),
            actioned_at: Utc::now(),
        };
        let action: ModerationAction = entity.clone().into();
        assert_eq!(action.action, ModerationDecision::Reject);
        assert_eq!(action.moderator_id, "gemini-auto");
    }
}
