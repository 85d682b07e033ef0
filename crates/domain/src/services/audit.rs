//! Builder for moderation action log rows.
//!
//! Every photo resolution, manual or automatic, records exactly one
//! action through this builder so the moderator identity and reason
//! conventions stay in one place.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{ModerationAction, ModerationDecision, MODERATOR_AUTO, MODERATOR_RETRY};

#[derive(Debug, Clone)]
pub struct ModerationActionBuilder {
    photo_id: Uuid,
    action: ModerationDecision,
    moderator_id: String,
    reason: Option<String>,
}

impl ModerationActionBuilder {
    pub fn new(photo_id: Uuid, action: ModerationDecision) -> Self {
        Self {
            photo_id,
            action,
            moderator_id: MODERATOR_AUTO.to_string(),
            reason: None,
        }
    }

    /// A human moderator identified by their user id.
    pub fn by_moderator(mut self, moderator_id: impl Into<String>) -> Self {
        self.moderator_id = moderator_id.into();
        self
    }

    /// The automatic policy engine during the normal analysis pass.
    pub fn by_auto(mut self) -> Self {
        self.moderator_id = MODERATOR_AUTO.to_string();
        self
    }

    /// The automatic policy engine during an admin retry batch.
    pub fn by_retry(mut self) -> Self {
        self.moderator_id = MODERATOR_RETRY.to_string();
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn reason_opt(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    pub fn build(self) -> ModerationAction {
        ModerationAction {
            id: Uuid::new_v4(),
            photo_id: self.photo_id,
            moderator_id: self.moderator_id,
            action: self.action,
            reason: self.reason,
            actioned_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_auto_moderator() {
        let action = ModerationActionBuilder::new(Uuid::new_v4(), ModerationDecision::Approve)
            .reason("Auto-approved by AI (95% confidence): clean")
            .build();
        assert_eq!(action.moderator_id, MODERATOR_AUTO);
        assert_eq!(action.action, ModerationDecision::Approve);
        assert!(action.reason.as_deref().unwrap().contains("95%"));
    }

    #[test]
    fn test_manual_moderator_identity() {
        let action = ModerationActionBuilder::new(Uuid::new_v4(), ModerationDecision::Reject)
            .by_moderator("admin-7")
            .reason_opt(None)
            .build();
        assert_eq!(action.moderator_id, "admin-7");
        assert_eq!(action.reason, None);
    }

    #[test]
    fn test_retry_identity() {
        let action = ModerationActionBuilder::new(Uuid::new_v4(), ModerationDecision::Reject)
            .by_retry()
            .build();
        assert_eq!(action.moderator_id, MODERATOR_RETRY);
    }
}
