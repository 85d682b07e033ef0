//! Photo entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::photo::{Photo, PhotoStatus};

/// Database row mapping for the photos table.
#[derive(Debug, Clone, FromRow)]
pub struct PhotoEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub storage_path: String,
    pub storage_url: Option<String>,
    pub caption: Option<String>,
    pub status: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<PhotoEntity> for Photo {
    fn from(entity: PhotoEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            storage_path: entity.storage_path,
            storage_url: entity.storage_url,
            caption: entity.caption,
            status: PhotoStatus::parse(&entity.status).unwrap_or(PhotoStatus::Pending),
            uploaded_by: entity.uploaded_by,
            uploaded_at: entity.uploaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_photo_entity() -> PhotoEntity {
        PhotoEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            storage_path: "events/AB12CD/photo-1.jpg".to_string(),
            storage_url: Some("https://storage.example.com/photo-1.jpg".to_string()),
            caption: Some("First dance".to_string()),
            status: "approved".to_string(),
            uploaded_by: "anonymous".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_photo_entity_to_domain() {
        let entity = create_test_photo_entity();
        let photo: Photo = entity.clone().into();

        assert_eq!(photo.id, entity.id);
        assert_eq!(photo.event_id, entity.event_id);
        assert_eq!(photo.storage_path, entity.storage_path);
        assert_eq!(photo.status, PhotoStatus::Approved);
        assert_eq!(photo.uploaded_by, "anonymous");
    }

    #[test]
    fn test_photo_entity_unknown_status_defaults_pending() {
        let mut entity = create_test_photo_entity();
        entity.status = "quarantined".to_string();

        let photo: Photo = entity.into();
        assert_eq!(photo.status, PhotoStatus::Pending);
    }
}
