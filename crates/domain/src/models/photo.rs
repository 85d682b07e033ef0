//! Photo domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_storage_path;

/// Photo visibility status. Only the moderation workflow transitions this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStatus {
    Pending,
    Approved,
    Rejected,
}

impl PhotoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoStatus::Pending => "pending",
            PhotoStatus::Approved => "approved",
            PhotoStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PhotoStatus::Pending),
            "approved" => Some(PhotoStatus::Approved),
            "rejected" => Some(PhotoStatus::Rejected),
            _ => None,
        }
    }
}

/// A photo registered to an event. The bytes live in the external object
/// store; we track the reference and the moderation status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Photo {
    pub id: Uuid,
    pub event_id: Uuid,
    pub storage_path: String,
    pub storage_url: Option<String>,
    pub caption: Option<String>,
    pub status: PhotoStatus,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Request to register an uploaded photo with an event. The client (or a
/// storage-side hook) uploads bytes to the object store first, then
/// registers the reference here.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterPhotoRequest {
    #[validate(custom(function = "validate_storage_path"))]
    pub storage_path: String,

    #[validate(url(message = "storage_url must be a valid URL"))]
    pub storage_url: Option<String>,

    #[validate(length(max = 500, message = "caption too long"))]
    pub caption: Option<String>,
}

/// Photo representation returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PhotoResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub storage_path: String,
    pub storage_url: Option<String>,
    pub caption: Option<String>,
    pub status: PhotoStatus,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Photo> for PhotoResponse {
    fn from(photo: Photo) -> Self {
        Self {
            id: photo.id,
            event_id: photo.event_id,
            storage_path: photo.storage_path,
            storage_url: photo.storage_url,
            caption: photo.caption,
            status: photo.status,
            uploaded_by: photo.uploaded_by,
            uploaded_at: photo.uploaded_at,
        }
    }
}

/// Response for a gallery listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListPhotosResponse {
    pub photos: Vec<PhotoResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            PhotoStatus::Pending,
            PhotoStatus::Approved,
            PhotoStatus::Rejected,
        ] {
            assert_eq!(PhotoStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PhotoStatus::parse("deleted"), None);
    }

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterPhotoRequest {
            storage_path: "events/e1/1700000000-pic.jpg".to_string(),
            storage_url: Some("https://cdn.example.com/pic.jpg".to_string()),
            caption: Some("the dance floor".to_string()),
        };
        assert!(ok.validate().is_ok());

        let traversal = RegisterPhotoRequest {
            storage_path: "events/../../etc".to_string(),
            storage_url: None,
            caption: None,
        };
        assert!(traversal.validate().is_err());

        let bad_url = RegisterPhotoRequest {
            storage_path: "events/e1/pic.jpg".to_string(),
            storage_url: Some("not a url".to_string()),
            caption: None,
        };
        assert!(bad_url.validate().is_err());
    }
}
