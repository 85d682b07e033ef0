//! Moderation endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    AnalysisBatchResponse, Event, ModerateRequest, ModerationAnalysis, ModerationDecision,
    ModerationQueueEntry, ModerationQueueItemResponse, ModerationQueueResponse, Photo,
    PhotoResponse,
};
use domain::services::audit::ModerationActionBuilder;
use persistence::repositories::{
    EventRepository, ModerationQueueRepository, ModerationResolution, PhotoRepository,
};
use shared::pagination::PageParams;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{metrics, UserAuth};
use crate::routes::events::find_event_by_code;
use crate::services::moderation::run_analysis_batch;

fn ensure_moderator(event: &Event, auth: &UserAuth) -> Result<(), ApiError> {
    if event.creator_id != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Only the event creator can moderate it".to_string(),
        ));
    }
    Ok(())
}

/// Run an AI analysis pass over the event's pending queue.
///
/// POST /api/v1/events/:code/moderation/analyze
pub async fn analyze_queue(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(code): Path<String>,
) -> Result<Json<AnalysisBatchResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_moderator(&event, &auth)?;

    let response = run_analysis_batch(
        &state.pool,
        state.moderation_client.as_ref(),
        event.id,
        state.config.moderation.batch_size,
        false,
    )
    .await?;

    info!(
        event_id = %event.id,
        analyzed = response.analyzed,
        auto_resolved = response.auto_resolved,
        failed = response.failed,
        "Analysis batch completed"
    );
    Ok(Json(response))
}

/// Re-run analysis for entries that previously failed. Admin only.
///
/// POST /api/v1/admin/events/:code/moderation/retry
pub async fn retry_failed(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(code): Path<String>,
) -> Result<Json<AnalysisBatchResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_moderator(&event, &auth)?;

    let response = run_analysis_batch(
        &state.pool,
        state.moderation_client.as_ref(),
        event.id,
        state.config.moderation.batch_size,
        true,
    )
    .await?;

    info!(
        event_id = %event.id,
        analyzed = response.analyzed,
        auto_resolved = response.auto_resolved,
        failed = response.failed,
        "Retry batch completed"
    );
    Ok(Json(response))
}

/// The pending moderation queue for an event, oldest first.
///
/// GET /api/v1/events/:code/moderation/queue
pub async fn get_queue(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(code): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<ModerationQueueResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_moderator(&event, &auth)?;

    let repo = ModerationQueueRepository::new(state.pool.clone());
    let joined = repo
        .find_pending_with_photos(event.id, page.limit(), page.offset())
        .await?;
    let total = repo.count_pending(event.id).await?;

    let items = joined
        .into_iter()
        .map(|(entry, photo)| {
            ModerationQueueItemResponse::from_parts(
                ModerationQueueEntry::from(entry),
                Photo::from(photo),
            )
        })
        .collect();

    Ok(Json(ModerationQueueResponse {
        items,
        total: total as usize,
    }))
}

/// Manually approve or reject a photo.
///
/// POST /api/v1/photos/:photo_id/moderate
pub async fn moderate_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(photo_id): Path<Uuid>,
    Json(request): Json<ModerateRequest>,
) -> Result<Json<PhotoResponse>, ApiError> {
    request.validate()?;

    let photo_repo = PhotoRepository::new(state.pool.clone());
    let photo = photo_repo
        .find_by_id(photo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    let event_repo = EventRepository::new(state.pool.clone());
    let event: Event = event_repo
        .find_by_id(photo.event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?
        .into();
    ensure_moderator(&event, &auth)?;

    let action = ModerationActionBuilder::new(photo_id, request.action)
        .by_moderator(&auth.user_id)
        .reason_opt(request.reason.clone())
        .build();

    let resolution = ModerationResolution {
        photo_id,
        new_status: request.action.photo_status().as_str().to_string(),
        suggestion: None,
        confidence: None,
        action,
    };

    let photo = photo_repo
        .resolve_moderation(&resolution)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    metrics::record_moderation_resolved("manual", request.action.as_str());
    info!(
        photo_id = %photo_id,
        moderator = %auth.user_id,
        action = request.action.as_str(),
        "Photo moderated"
    );

    Ok(Json(Photo::from(photo).into()))
}

/// Request body for one-off photo analysis.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AnalyzePhotoRequest {
    #[validate(url(message = "photo_url must be a valid url"))]
    pub photo_url: String,
}

/// Analysis result as returned on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyzePhotoResponse {
    pub suggestion: Option<ModerationDecision>,
    pub confidence: f32,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<ModerationAnalysis> for AnalyzePhotoResponse {
    fn from(analysis: ModerationAnalysis) -> Self {
        Self {
            suggestion: analysis.suggestion,
            confidence: analysis.confidence,
            reason: analysis.reason,
            error_message: analysis.error_message,
        }
    }
}

/// Analyze a single photo by URL without touching the queue.
///
/// POST /api/v1/moderation/analyze-photo
pub async fn analyze_photo(
    State(state): State<AppState>,
    Json(request): Json<AnalyzePhotoRequest>,
) -> Result<Json<AnalyzePhotoResponse>, ApiError> {
    request.validate()?;

    // A missing analyzer is a soft failure on this endpoint: the caller
    // still gets a 200 with no suggestion so it can fall back to manual
    // review.
    let Some(analyzer) = state.moderation_client.as_ref() else {
        return Ok(Json(AnalyzePhotoResponse {
            suggestion: None,
            confidence: 0.0,
            reason: String::new(),
            error_message: Some("AI analysis not configured".to_string()),
        }));
    };

    let analysis = analyzer.analyze(&request.photo_url).await;
    Ok(Json(analysis.into()))
}
