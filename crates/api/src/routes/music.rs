//! Music search endpoint handlers.
//!
//! A single dispatch endpoint mirrors how jukebox clients talk to the
//! provider bridge: the request names an action and the matching fields.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use domain::models::{MusicProvider, Track};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::credentials::SpotifyToken;
use crate::services::music_search::{MusicSearchClient, MusicSearchError};

const SEARCH_LIMIT: usize = 10;

/// Music bridge request. `action` picks the operation; absent or
/// unrecognized actions fall through to the raw Spotify token grant.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MusicSearchRequest {
    pub action: Option<String>,
    pub query: Option<String>,
    pub artists: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MusicSearchResponse {
    Tracks { tracks: Vec<Track> },
    Genres { genres: BTreeMap<String, String> },
    Token(SpotifyToken),
}

/// Dispatch a music bridge action.
///
/// POST /api/v1/music/search
pub async fn music_search(
    State(state): State<AppState>,
    Json(request): Json<MusicSearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match request.action.as_deref() {
        Some("search_spotify") => {
            let client = require_client(&state)?;
            if !client.spotify_configured().await {
                return Err(ApiError::Validation(
                    "Spotify credentials not configured".to_string(),
                ));
            }
            let query = require_query(request.query.as_deref())?;
            let tracks = client
                .search(MusicProvider::Spotify, query, SEARCH_LIMIT)
                .await
                .map_err(map_music_error)?;
            debug!(count = tracks.len(), "Spotify search served");
            Ok(Json(MusicSearchResponse::Tracks { tracks }))
        }
        Some("search_youtube") => {
            let client = require_client(&state)?;
            if !client.youtube_configured().await {
                return Err(ApiError::Validation(
                    "YouTube API key not configured".to_string(),
                ));
            }
            let query = require_query(request.query.as_deref())?;
            let tracks = client
                .search(MusicProvider::Youtube, query, SEARCH_LIMIT)
                .await
                .map_err(map_music_error)?;
            debug!(count = tracks.len(), "YouTube search served");
            Ok(Json(MusicSearchResponse::Tracks { tracks }))
        }
        // Genre enrichment degrades to an empty map rather than erroring,
        // callers treat genres as decoration.
        Some("get_artist_genres") => {
            let genres = match (state.music_client.as_ref(), request.artists) {
                (Some(client), Some(artists)) if !artists.is_empty() => {
                    client.genres_for_artists(&artists).await
                }
                _ => BTreeMap::new(),
            };
            Ok(Json(MusicSearchResponse::Genres { genres }))
        }
        // Default action: hand the caller a Spotify token to drive the
        // provider directly.
        _ => {
            let client = require_client(&state)?;
            if !client.spotify_configured().await {
                return Err(ApiError::Validation(
                    "Spotify credentials not configured".to_string(),
                ));
            }
            let token = client.spotify_token().await.map_err(map_music_error)?;
            Ok(Json(MusicSearchResponse::Token(token)))
        }
    }
}

fn require_client(state: &AppState) -> Result<&MusicSearchClient, ApiError> {
    state.music_client.as_deref().ok_or_else(|| {
        ApiError::Validation("Music search not configured".to_string())
    })
}

fn require_query(query: Option<&str>) -> Result<&str, ApiError> {
    match query.map(str::trim) {
        Some(query) if !query.is_empty() => Ok(query),
        _ => Err(ApiError::Validation("Query is required".to_string())),
    }
}

fn map_music_error(err: MusicSearchError) -> ApiError {
    match err {
        MusicSearchError::NotConfigured(provider) => {
            ApiError::Validation(format!("Provider not configured: {}", provider))
        }
        MusicSearchError::Token(e) => {
            ApiError::ServiceUnavailable(format!("Provider authentication failed: {}", e))
        }
        MusicSearchError::Rejected(status) => {
            ApiError::ServiceUnavailable(format!("Provider rejected request: HTTP {}", status))
        }
        MusicSearchError::Http(e) => {
            ApiError::ServiceUnavailable(format!("Provider request failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_search() {
        let request: MusicSearchRequest = serde_json::from_str(
            r#"{"action": "search_spotify", "query": "daft punk"}"#,
        )
        .unwrap();
        assert_eq!(request.action.as_deref(), Some("search_spotify"));
        assert_eq!(request.query.as_deref(), Some("daft punk"));
        assert!(request.artists.is_none());
    }

    #[test]
    fn test_request_deserializes_artist_genres() {
        let request: MusicSearchRequest = serde_json::from_str(
            r#"{"action": "get_artist_genres", "artists": ["Daft Punk", "Rick Astley"]}"#,
        )
        .unwrap();
        assert_eq!(request.artists.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_empty_body_is_default_action() {
        let request: MusicSearchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.action.is_none());
    }

    #[test]
    fn test_require_query_rejects_blank() {
        assert!(require_query(None).is_err());
        assert!(require_query(Some("   ")).is_err());
        assert_eq!(require_query(Some(" abba ")).unwrap(), "abba");
    }

    #[test]
    fn test_genres_response_shape() {
        let mut genres = BTreeMap::new();
        genres.insert("Daft Punk".to_string(), "french house".to_string());
        let json = serde_json::to_value(MusicSearchResponse::Genres { genres }).unwrap();
        assert_eq!(json["genres"]["Daft Punk"], "french house");
    }
}
