//! Jukebox entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::jukebox::{
    JukeboxQueueItem, JukeboxSettings, MusicProvider, QueueItemStatus,
};

/// Database row mapping for the jukebox_settings table.
#[derive(Debug, Clone, FromRow)]
pub struct JukeboxSettingsEntity {
    pub event_id: Uuid,
    pub enabled: bool,
    pub provider: String,
    pub updated_at: DateTime<Utc>,
}

impl From<JukeboxSettingsEntity> for JukeboxSettings {
    fn from(entity: JukeboxSettingsEntity) -> Self {
        Self {
            event_id: entity.event_id,
            enabled: entity.enabled,
            provider: MusicProvider::parse(&entity.provider).unwrap_or(MusicProvider::Spotify),
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the jukebox_queue table.
#[derive(Debug, Clone, FromRow)]
pub struct JukeboxQueueEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub artwork_url: Option<String>,
    pub duration_ms: Option<i64>,
    pub genre: String,
    pub provider: String,
    pub votes: i32,
    pub status: String,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<JukeboxQueueEntity> for JukeboxQueueItem {
    fn from(entity: JukeboxQueueEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            track_id: entity.track_id,
            title: entity.title,
            artist: entity.artist,
            album: entity.album,
            artwork_url: entity.artwork_url,
            duration_ms: entity.duration_ms,
            genre: entity.genre,
            provider: MusicProvider::parse(&entity.provider).unwrap_or(MusicProvider::Spotify),
            votes: entity.votes,
            status: QueueItemStatus::parse(&entity.status).unwrap_or(QueueItemStatus::Pending),
            added_by: entity.added_by,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_entity_to_domain() {
        let entity = JukeboxSettingsEntity {
            event_id: Uuid::new_v4(),
            enabled: true,
            provider: "youtube".to_string(),
            updated_at: Utc::now(),
        };
        let settings: JukeboxSettings = entity.clone().into();
        assert_eq!(settings.event_id, entity.event_id);
        assert!(settings.enabled);
        assert_eq!(settings.provider, MusicProvider::Youtube);
    }

    #[test]
    fn test_queue_entity_to_domain() {
        let entity = JukeboxQueueEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            track_id: "4uLU6hMCjMI75M1A2tKUQC".to_string(),
            title: "Never Gonna Give You Up".to_string(),
            artist: "Rick Astley".to_string(),
            album: Some("Whenever You Need Somebody".to_string()),
            artwork_url: None,
            duration_ms: Some(213_573),
            genre: "pop".to_string(),
            provider: "spotify".to_string(),
            votes: 3,
            status: "pending".to_string(),
            added_by: "anonymous".to_string(),
            created_at: Utc::now(),
        };
        let item: JukeboxQueueItem = entity.clone().into();
        assert_eq!(item.track_id, entity.track_id);
        assert_eq!(item.provider, MusicProvider::Spotify);
        assert_eq!(item.status, QueueItemStatus::Pending);
        assert_eq!(item.votes, 3);
    }
}
