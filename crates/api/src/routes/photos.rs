//! Photo endpoint handlers.
//!
//! Photo bytes live in external object storage; clients upload there
//! first and then register the result here. Registration for a moderated
//! event creates the photo and its queue entry atomically.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use domain::models::{
    ListPhotosResponse, Photo, PhotoResponse, PhotoStatus, RegisterPhotoRequest,
};
use persistence::repositories::PhotoRepository;
use shared::pagination::PageParams;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{acting_user_id, metrics, UserAuth};
use crate::routes::events::{ensure_writable, find_event_by_code};

/// Register a photo against an event.
///
/// POST /api/v1/events/:code/photos
pub async fn register_photo(
    State(state): State<AppState>,
    Path(code): Path<String>,
    auth: Option<Extension<UserAuth>>,
    Json(request): Json<RegisterPhotoRequest>,
) -> Result<(StatusCode, Json<PhotoResponse>), ApiError> {
    request.validate()?;

    let event = find_event_by_code(&state, &code).await?;
    ensure_writable(&event)?;

    let uploaded_by = acting_user_id(auth.as_deref()).to_string();
    let repo = PhotoRepository::new(state.pool.clone());

    let photo: Photo = if event.moderation_enabled {
        let (photo, _entry) = repo
            .create_with_queue_entry(
                event.id,
                &request.storage_path,
                request.storage_url.as_deref(),
                request.caption.as_deref(),
                &uploaded_by,
            )
            .await?;
        photo.into()
    } else {
        // Unmoderated events approve on arrival.
        repo.create(
            event.id,
            &request.storage_path,
            request.storage_url.as_deref(),
            request.caption.as_deref(),
            PhotoStatus::Approved.as_str(),
            &uploaded_by,
        )
        .await?
        .into()
    };

    metrics::record_photo_registered(event.moderation_enabled);
    info!(
        photo_id = %photo.id,
        event_id = %event.id,
        status = photo.status.as_str(),
        "Photo registered"
    );

    Ok((StatusCode::CREATED, Json(photo.into())))
}

/// List approved photos for an event.
///
/// GET /api/v1/events/:code/photos
pub async fn list_photos(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListPhotosResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;

    let repo = PhotoRepository::new(state.pool.clone());
    let status = PhotoStatus::Approved.as_str();
    let entities = repo
        .find_by_event_and_status(event.id, status, page.limit(), page.offset())
        .await?;
    let total = repo.count_by_event_and_status(event.id, status).await?;

    let photos = entities
        .into_iter()
        .map(|e| Photo::from(e).into())
        .collect();

    Ok(Json(ListPhotosResponse {
        photos,
        total: total as usize,
    }))
}
