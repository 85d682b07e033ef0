//! Jukebox endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    AddTrackRequest, Event, JukeboxQueueItem, JukeboxSettings, MusicProvider,
    UpdateJukeboxSettingsRequest,
};
use domain::services::queue_order;
use persistence::repositories::{JukeboxQueueRepository, JukeboxSettingsRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{acting_user_id, metrics, UserAuth};
use crate::routes::events::{ensure_writable, find_event_by_code};
use crate::services::music_search::UNKNOWN_GENRE;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JukeboxResponse {
    pub settings: JukeboxSettings,
    pub queue: Vec<JukeboxQueueItem>,
}

/// Settings for events that never touched theirs.
fn default_settings(event_id: Uuid) -> JukeboxSettings {
    JukeboxSettings {
        event_id,
        enabled: true,
        provider: MusicProvider::Spotify,
        updated_at: Utc::now(),
    }
}

async fn load_settings(state: &AppState, event_id: Uuid) -> Result<JukeboxSettings, ApiError> {
    let repo = JukeboxSettingsRepository::new(state.pool.clone());
    Ok(repo
        .find_by_event_id(event_id)
        .await?
        .map(JukeboxSettings::from)
        .unwrap_or_else(|| default_settings(event_id)))
}

/// The jukebox view for an event: settings plus the pending queue in
/// playback order.
///
/// GET /api/v1/events/:code/jukebox
pub async fn get_jukebox(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<JukeboxResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    let settings = load_settings(&state, event.id).await?;

    let queue_repo = JukeboxQueueRepository::new(state.pool.clone());
    let queue = queue_repo
        .find_pending(event.id)
        .await?
        .into_iter()
        .map(JukeboxQueueItem::from)
        .collect();

    Ok(Json(JukeboxResponse { settings, queue }))
}

/// Update jukebox settings for an event.
///
/// PUT /api/v1/events/:code/jukebox/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(code): Path<String>,
    Json(request): Json<UpdateJukeboxSettingsRequest>,
) -> Result<Json<JukeboxSettings>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_creator(&event, &auth)?;
    ensure_writable(&event)?;

    let repo = JukeboxSettingsRepository::new(state.pool.clone());
    let entity = repo
        .upsert(
            event.id,
            request.enabled,
            request.provider.map(|p| p.as_str()),
        )
        .await?;

    info!(
        event_id = %event.id,
        enabled = entity.enabled,
        provider = %entity.provider,
        "Jukebox settings updated"
    );
    Ok(Json(entity.into()))
}

/// Add a track to the queue.
///
/// POST /api/v1/events/:code/jukebox/queue
pub async fn add_track(
    State(state): State<AppState>,
    Path(code): Path<String>,
    auth: Option<Extension<UserAuth>>,
    Json(request): Json<AddTrackRequest>,
) -> Result<(StatusCode, Json<JukeboxQueueItem>), ApiError> {
    request.validate()?;

    let event = find_event_by_code(&state, &code).await?;
    ensure_writable(&event)?;

    let settings = load_settings(&state, event.id).await?;
    if !settings.enabled {
        return Err(ApiError::Forbidden(
            "Jukebox is disabled for this event".to_string(),
        ));
    }

    let queue_repo = JukeboxQueueRepository::new(state.pool.clone());
    let queue: Vec<JukeboxQueueItem> = queue_repo
        .find_pending(event.id)
        .await?
        .into_iter()
        .map(JukeboxQueueItem::from)
        .collect();

    if queue_order::is_duplicate(
        &queue,
        request.provider,
        &request.track_id,
        &request.title,
        &request.artist,
    ) {
        return Err(ApiError::Conflict(
            "Track is already in the queue".to_string(),
        ));
    }

    // Genre is decoration: one best-effort Spotify lookup, never a
    // reason to refuse the track.
    let genre = match (&state.music_client, request.provider) {
        (Some(client), MusicProvider::Spotify) => client.genre_for_artist(&request.artist).await,
        _ => UNKNOWN_GENRE.to_string(),
    };

    let added_by = acting_user_id(auth.as_deref()).to_string();
    let entity = queue_repo
        .add_track(
            event.id,
            &request.track_id,
            &request.title,
            &request.artist,
            request.album.as_deref(),
            request.artwork_url.as_deref(),
            request.duration_ms,
            &genre,
            request.provider.as_str(),
            &added_by,
        )
        .await?;

    metrics::record_track_added(request.provider.as_str());
    info!(
        event_id = %event.id,
        track_id = %entity.track_id,
        provider = %entity.provider,
        "Track added to jukebox queue"
    );

    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Upvote a queued track.
///
/// POST /api/v1/events/:code/jukebox/queue/:item_id/vote
pub async fn vote(
    State(state): State<AppState>,
    Path((code, item_id)): Path<(String, Uuid)>,
) -> Result<Json<JukeboxQueueItem>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_writable(&event)?;

    let queue_repo = JukeboxQueueRepository::new(state.pool.clone());
    let item = fetch_event_item(&queue_repo, event.id, item_id).await?;

    let updated = queue_repo
        .upvote(item.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Track not found in queue".to_string()))?;

    Ok(Json(updated.into()))
}

/// Mark a queued track as played.
///
/// POST /api/v1/events/:code/jukebox/queue/:item_id/played
pub async fn mark_played(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path((code, item_id)): Path<(String, Uuid)>,
) -> Result<Json<JukeboxQueueItem>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_creator(&event, &auth)?;

    let queue_repo = JukeboxQueueRepository::new(state.pool.clone());
    let item = fetch_event_item(&queue_repo, event.id, item_id).await?;

    let updated = queue_repo
        .mark_played(item.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Track not found in queue".to_string()))?;

    info!(event_id = %event.id, item_id = %item_id, "Track marked played");
    Ok(Json(updated.into()))
}

/// Remove a track from the queue.
///
/// DELETE /api/v1/events/:code/jukebox/queue/:item_id
pub async fn remove_track(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path((code, item_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    ensure_creator(&event, &auth)?;

    let queue_repo = JukeboxQueueRepository::new(state.pool.clone());
    let item = fetch_event_item(&queue_repo, event.id, item_id).await?;

    if queue_repo.delete(item.id).await? {
        info!(event_id = %event.id, item_id = %item_id, "Track removed from queue");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Track not found in queue".to_string()))
    }
}

fn ensure_creator(event: &Event, auth: &UserAuth) -> Result<(), ApiError> {
    if event.creator_id != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Only the event creator can manage the jukebox".to_string(),
        ));
    }
    Ok(())
}

/// Item lookup scoped to an event, so guessing item ids across events
/// yields 404.
async fn fetch_event_item(
    repo: &JukeboxQueueRepository,
    event_id: Uuid,
    item_id: Uuid,
) -> Result<JukeboxQueueItem, ApiError> {
    let item: JukeboxQueueItem = repo
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Track not found in queue".to_string()))?
        .into();
    if item.event_id != event_id {
        return Err(ApiError::NotFound("Track not found in queue".to_string()));
    }
    Ok(item)
}
