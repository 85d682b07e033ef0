//! Jukebox domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Music catalogue backing a jukebox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicProvider {
    Spotify,
    Youtube,
}

impl MusicProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            MusicProvider::Spotify => "spotify",
            MusicProvider::Youtube => "youtube",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spotify" => Some(MusicProvider::Spotify),
            "youtube" => Some(MusicProvider::Youtube),
            _ => None,
        }
    }
}

/// Playback state of a queued track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueItemStatus {
    Pending,
    Played,
}

impl QueueItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueItemStatus::Pending => "pending",
            QueueItemStatus::Played => "played",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(QueueItemStatus::Pending),
            "played" => Some(QueueItemStatus::Played),
            _ => None,
        }
    }
}

/// A track as returned by a provider search, normalized across
/// providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Track {
    /// Provider-native identifier (Spotify track id or YouTube video id).
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_art: Option<String>,
    pub preview_url: Option<String>,
    pub provider: MusicProvider,
}

/// Per-event jukebox configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JukeboxSettings {
    pub event_id: Uuid,
    pub enabled: bool,
    pub provider: MusicProvider,
    pub updated_at: DateTime<Utc>,
}

/// One entry in an event's jukebox queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JukeboxQueueItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub artwork_url: Option<String>,
    pub duration_ms: Option<i64>,
    /// Best-effort genre tag, `unknown` when enrichment found nothing.
    pub genre: String,
    pub provider: MusicProvider,
    pub votes: i32,
    pub status: QueueItemStatus,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for adding a track to the queue.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddTrackRequest {
    #[validate(length(min = 1, max = 256, message = "track id required"))]
    pub track_id: String,
    #[validate(length(min = 1, max = 512, message = "title required"))]
    pub title: String,
    #[validate(length(min = 1, max = 512, message = "artist required"))]
    pub artist: String,
    pub album: Option<String>,
    #[validate(url(message = "artwork_url must be a valid url"))]
    pub artwork_url: Option<String>,
    pub duration_ms: Option<i64>,
    pub provider: MusicProvider,
}

/// Request body for updating jukebox settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateJukeboxSettingsRequest {
    pub enabled: Option<bool>,
    pub provider: Option<MusicProvider>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        for p in [MusicProvider::Spotify, MusicProvider::Youtube] {
            assert_eq!(MusicProvider::parse(p.as_str()), Some(p));
        }
        assert_eq!(MusicProvider::parse("soundcloud"), None);
    }

    #[test]
    fn test_provider_wire_names() {
        let json = serde_json::to_string(&MusicProvider::Youtube).unwrap();
        assert_eq!(json, "\"youtube\"");
    }

    #[test]
    fn test_queue_item_status_round_trip() {
        for s in [QueueItemStatus::Pending, QueueItemStatus::Played] {
            assert_eq!(QueueItemStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(QueueItemStatus::parse("skipped"), None);
    }
}
