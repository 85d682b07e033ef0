//! Event entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::event::{Event, EventStatus};

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub code: String,
    pub creator_id: String,
    pub moderation_enabled: bool,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: entity.id,
            code: entity.code,
            creator_id: entity.creator_id,
            moderation_enabled: entity.moderation_enabled,
            status: EventStatus::parse(&entity.status).unwrap_or(EventStatus::Active),
            created_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_event_entity() -> EventEntity {
        EventEntity {
            id: Uuid::new_v4(),
            code: "AB12CD".to_string(),
            creator_id: "user-1".to_string(),
            moderation_enabled: true,
            status: "active".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(24),
        }
    }

    #[test]
    fn test_event_entity_to_domain() {
        let entity = create_test_event_entity();
        let event: Event = entity.clone().into();

        assert_eq!(event.id, entity.id);
        assert_eq!(event.code, entity.code);
        assert_eq!(event.creator_id, entity.creator_id);
        assert!(event.moderation_enabled);
        assert_eq!(event.status, EventStatus::Active);
    }

    #[test]
    fn test_event_entity_unknown_status_defaults_active() {
        let mut entity = create_test_event_entity();
        entity.status = "archived".to_string();

        let event: Event = entity.into();
        assert_eq!(event.status, EventStatus::Active);
    }
}
