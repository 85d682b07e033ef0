//! Event endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use domain::models::{CreateEventRequest, Event, EventResponse};
use persistence::repositories::{EventRepository, JukeboxSettingsRepository};
use shared::codes::generate_event_code;
use shared::pagination::PageParams;
use shared::validation::validate_event_code;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::UserAuth;

/// Attempts at finding an unused join code before giving up.
const CODE_GENERATION_ATTEMPTS: u32 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListEventsResponse {
    pub events: Vec<EventResponse>,
}

/// Create a new event.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let expires_at = Utc::now() + request.duration.as_duration();

    // Code collisions are rare (36^6 space) but possible; regenerate on
    // unique violations instead of surfacing a 409 to the caller.
    for _ in 0..CODE_GENERATION_ATTEMPTS {
        let code = generate_event_code();
        match repo
            .create(&code, &auth.user_id, request.moderation_enabled, expires_at)
            .await
        {
            Ok(entity) => {
                let event: Event = entity.into();
                // Every event gets a jukebox settings row up front, so
                // GET settings never has to synthesize defaults.
                JukeboxSettingsRepository::new(state.pool.clone())
                    .upsert(event.id, None, None)
                    .await?;
                info!(
                    event_id = %event.id,
                    code = %event.code,
                    moderation_enabled = event.moderation_enabled,
                    "Event created"
                );
                return Ok((StatusCode::CREATED, Json(event.into())));
            }
            Err(e) => match ApiError::from(e) {
                ApiError::Conflict(_) => continue,
                other => return Err(other),
            },
        }
    }
    Err(ApiError::Internal(
        "Could not allocate a unique event code".to_string(),
    ))
}

/// Look up an event by join code.
///
/// GET /api/v1/events/:code
pub async fn get_event(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    Ok(Json(event.into()))
}

/// List the caller's events, newest first.
///
/// GET /api/v1/events
pub async fn list_my_events(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Query(page): Query<PageParams>,
) -> Result<Json<ListEventsResponse>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let entities = repo
        .find_by_creator(&auth.user_id, page.limit(), page.offset())
        .await?;
    let events = entities
        .into_iter()
        .map(|e| Event::from(e).into())
        .collect();
    Ok(Json(ListEventsResponse { events }))
}

/// Deactivate an event before its natural expiry.
///
/// DELETE /api/v1/events/:code
pub async fn deactivate_event(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(code): Path<String>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;
    if event.creator_id != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Only the event creator can deactivate it".to_string(),
        ));
    }

    let repo = EventRepository::new(state.pool.clone());
    let entity = repo
        .deactivate(event.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    info!(event_id = %event.id, code = %event.code, "Event deactivated");
    Ok(Json(Event::from(entity).into()))
}

/// Shared lookup: event by code, 404 when the code is unknown or
/// malformed. Codes are stored uppercase; guests type them however
/// they like.
pub async fn find_event_by_code(state: &AppState, code: &str) -> Result<Event, ApiError> {
    let code = code.trim().to_uppercase();
    if validate_event_code(&code).is_err() {
        return Err(ApiError::NotFound("Event not found".to_string()));
    }
    let repo = EventRepository::new(state.pool.clone());
    let entity = repo
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;
    Ok(entity.into())
}

/// Shared guard: event must still accept writes. Events past their
/// expiry respond 410 Gone so clients can distinguish "over" from
/// "never existed". Deactivated events never resolve by code in the
/// first place.
pub fn ensure_writable(event: &Event) -> Result<(), ApiError> {
    if !event.is_writable_at(Utc::now()) {
        return Err(ApiError::Gone("Event has ended".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::models::EventStatus;
    use uuid::Uuid;

    fn event(expires_in_secs: i64, status: EventStatus) -> Event {
        Event {
            id: Uuid::new_v4(),
            code: "AB12CD".to_string(),
            creator_id: "user-1".to_string(),
            moderation_enabled: false,
            status,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    fn test_ensure_writable_active_event() {
        assert!(ensure_writable(&event(3600, EventStatus::Active)).is_ok());
    }

    #[test]
    fn test_ensure_writable_expired_event_gone() {
        let result = ensure_writable(&event(-10, EventStatus::Active));
        assert!(matches!(result, Err(ApiError::Gone(_))));
    }

    #[test]
    fn test_ensure_writable_deactivated_event_gone() {
        let result = ensure_writable(&event(3600, EventStatus::Expired));
        assert!(matches!(result, Err(ApiError::Gone(_))));
    }
}
