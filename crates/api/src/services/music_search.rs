//! Music catalogue search across Spotify and YouTube.

use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use domain::models::{MusicProvider, Track};

use crate::services::credentials::{
    CredentialsResolver, SpotifyToken, SpotifyTokenCache, TokenError,
};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube category id for music videos.
const YOUTUBE_MUSIC_CATEGORY: &str = "10";

/// Cap on artists looked up per genre enrichment request.
const MAX_GENRE_LOOKUPS: usize = 5;

/// Genre recorded when no lookup succeeded.
pub const UNKNOWN_GENRE: &str = "unknown";

#[derive(Debug, Error)]
pub enum MusicSearchError {
    #[error("Provider not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected request: HTTP {0}")]
    Rejected(u16),
}

/// Client for searching tracks across the configured providers.
///
/// Provider credentials resolve per request through the
/// [`CredentialsResolver`], so keys saved in the admin panel take
/// effect without a restart.
pub struct MusicSearchClient {
    http: Client,
    credentials: CredentialsResolver,
    spotify_token: SpotifyTokenCache,
}

impl MusicSearchClient {
    pub fn new(credentials: CredentialsResolver, timeout_ms: u64) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            http,
            credentials,
            spotify_token: SpotifyTokenCache::new(),
        })
    }

    /// Search the given provider's catalogue.
    pub async fn search(
        &self,
        provider: MusicProvider,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Track>, MusicSearchError> {
        match provider {
            MusicProvider::Spotify => self.search_spotify(query, limit).await,
            MusicProvider::Youtube => self.search_youtube(query, limit).await,
        }
    }

    async fn search_spotify(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Track>, MusicSearchError> {
        let token = self.spotify_access_token().await?;
        let response = self
            .http
            .get(format!("{}/search", SPOTIFY_API_URL))
            .bearer_auth(&token)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MusicSearchError::Rejected(response.status().as_u16()));
        }

        let parsed: SpotifySearchResponse = response.json().await?;
        let tracks = map_spotify_tracks(parsed);
        debug!(count = tracks.len(), "Spotify search completed");
        Ok(tracks)
    }

    async fn search_youtube(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Track>, MusicSearchError> {
        let api_key = self
            .credentials
            .youtube_api_key()
            .await
            .ok_or(MusicSearchError::NotConfigured("youtube"))?;
        let response = self
            .http
            .get(format!("{}/search", YOUTUBE_API_URL))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoCategoryId", YOUTUBE_MUSIC_CATEGORY),
                ("maxResults", &limit.to_string()),
                ("q", query),
                ("key", &api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MusicSearchError::Rejected(response.status().as_u16()));
        }

        let parsed: YoutubeSearchResponse = response.json().await?;
        let tracks = map_youtube_tracks(parsed);
        debug!(count = tracks.len(), "YouTube search completed");
        Ok(tracks)
    }

    pub async fn spotify_configured(&self) -> bool {
        self.credentials.spotify_credentials().await.is_some()
    }

    pub async fn youtube_configured(&self) -> bool {
        self.credentials.youtube_api_key().await.is_some()
    }

    async fn spotify_access_token(&self) -> Result<String, MusicSearchError> {
        let (id, secret) = self
            .credentials
            .spotify_credentials()
            .await
            .ok_or(MusicSearchError::NotConfigured("spotify"))?;
        Ok(self
            .spotify_token
            .access_token(&self.http, &id, &secret)
            .await?)
    }

    /// A fresh Spotify client-credentials token object.
    pub async fn spotify_token(&self) -> Result<SpotifyToken, MusicSearchError> {
        let (id, secret) = self
            .credentials
            .spotify_credentials()
            .await
            .ok_or(MusicSearchError::NotConfigured("spotify"))?;
        Ok(self.spotify_token.fetch_token(&self.http, &id, &secret).await?)
    }

    /// Best-effort genre per artist name, via Spotify artist search.
    ///
    /// Degrades rather than fails: missing credentials or a token error
    /// yield an empty map, individual lookup failures yield `unknown`.
    /// Artists are deduplicated and capped to bound upstream calls.
    pub async fn genres_for_artists(&self, artists: &[String]) -> BTreeMap<String, String> {
        let token = match self.spotify_access_token().await {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "Genre enrichment skipped");
                return BTreeMap::new();
            }
        };

        let mut unique: Vec<&String> = Vec::new();
        for artist in artists {
            if !unique.contains(&artist) {
                unique.push(artist);
            }
            if unique.len() == MAX_GENRE_LOOKUPS {
                break;
            }
        }

        let mut genres = BTreeMap::new();
        for artist in unique {
            let genre = self
                .lookup_artist_genre(&token, artist)
                .await
                .unwrap_or_else(|e| {
                    debug!(artist = %artist, error = %e, "Artist genre lookup failed");
                    UNKNOWN_GENRE.to_string()
                });
            genres.insert(artist.clone(), genre);
        }
        genres
    }

    /// Best-effort genre for a single artist name.
    pub async fn genre_for_artist(&self, artist: &str) -> String {
        self.genres_for_artists(&[artist.to_string()])
            .await
            .remove(artist)
            .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
    }

    async fn lookup_artist_genre(
        &self,
        token: &str,
        artist: &str,
    ) -> Result<String, MusicSearchError> {
        let response = self
            .http
            .get(format!("{}/search", SPOTIFY_API_URL))
            .bearer_auth(token)
            .query(&[
                ("q", format!("artist:{}", artist).as_str()),
                ("type", "artist"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MusicSearchError::Rejected(response.status().as_u16()));
        }

        let parsed: SpotifyArtistSearchResponse = response.json().await?;
        Ok(parsed
            .artists
            .items
            .into_iter()
            .next()
            .and_then(|a| a.genres.into_iter().next())
            .unwrap_or_else(|| UNKNOWN_GENRE.to_string()))
    }
}

// Spotify wire types.

#[derive(Debug, Deserialize)]
struct SpotifySearchResponse {
    tracks: SpotifyTrackPage,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrackPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtistRef>,
    album: Option<SpotifyAlbum>,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtistSearchResponse {
    artists: SpotifyArtistPage,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtistPage {
    #[serde(default)]
    items: Vec<SpotifyArtist>,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    #[serde(default)]
    genres: Vec<String>,
}

fn map_spotify_tracks(response: SpotifySearchResponse) -> Vec<Track> {
    response
        .tracks
        .items
        .into_iter()
        .map(|item| {
            let artist = item
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let album_art = item
                .album
                .and_then(|album| album.images.into_iter().next().map(|i| i.url));
            Track {
                id: item.id,
                title: item.name,
                artist,
                album_art,
                preview_url: item.preview_url,
                provider: MusicProvider::Spotify,
            }
        })
        .collect()
}

// YouTube wire types.

#[derive(Debug, Deserialize)]
struct YoutubeSearchResponse {
    #[serde(default)]
    items: Vec<YoutubeItem>,
}

#[derive(Debug, Deserialize)]
struct YoutubeItem {
    id: YoutubeId,
    snippet: YoutubeSnippet,
}

#[derive(Debug, Deserialize)]
struct YoutubeId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YoutubeSnippet {
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: YoutubeThumbnails,
}

#[derive(Debug, Deserialize, Default)]
struct YoutubeThumbnails {
    high: Option<YoutubeThumbnail>,
    #[serde(rename = "default")]
    fallback: Option<YoutubeThumbnail>,
}

#[derive(Debug, Deserialize)]
struct YoutubeThumbnail {
    url: String,
}

fn map_youtube_tracks(response: YoutubeSearchResponse) -> Vec<Track> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id?;
            let album_art = item
                .snippet
                .thumbnails
                .high
                .or(item.snippet.thumbnails.fallback)
                .map(|t| t.url);
            Some(Track {
                id: video_id,
                title: item.snippet.title,
                artist: item.snippet.channel_title,
                album_art,
                // YouTube search results carry no audio preview.
                preview_url: None,
                provider: MusicProvider::Youtube,
            })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_spotify_tracks() {
        let response: SpotifySearchResponse = serde_json::from_value(serde_json::json!({
            "tracks": {
                "items": [{
                    "id": "abc123",
                    "name": "Song A",
                    "artists": [{"name": "Artist One"}, {"name": "Artist Two"}],
                    "album": {
                        "images": [{"url": "https://img.example.com/large.jpg"}]
                    },
                    "preview_url": "https://p.example.com/abc123.mp3"
                }]
            }
        }))
        .unwrap();

        let tracks = map_spotify_tracks(response);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "abc123");
        assert_eq!(tracks[0].artist, "Artist One, Artist Two");
        assert_eq!(
            tracks[0].album_art.as_deref(),
            Some("https://img.example.com/large.jpg")
        );
        assert_eq!(
            tracks[0].preview_url.as_deref(),
            Some("https://p.example.com/abc123.mp3")
        );
        assert_eq!(tracks[0].provider, MusicProvider::Spotify);
    }

    #[test]
    fn test_map_youtube_tracks_skips_non_videos() {
        let response: YoutubeSearchResponse = serde_json::from_value(serde_json::json!({
            "items": [
                {
                    "id": {"videoId": "vid1"},
                    "snippet": {
                        "title": "Song B",
                        "channelTitle": "Channel B",
                        "thumbnails": {"high": {"url": "https://img.example.com/hq.jpg"}}
                    }
                },
                {
                    "id": {},
                    "snippet": {"title": "A playlist", "channelTitle": "x"}
                }
            ]
        }))
        .unwrap();

        let tracks = map_youtube_tracks(response);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "vid1");
        assert_eq!(tracks[0].artist, "Channel B");
        assert_eq!(tracks[0].preview_url, None);
        assert_eq!(tracks[0].provider, MusicProvider::Youtube);
    }

    #[test]
    fn test_artist_search_response_parses_genres() {
        let response: SpotifyArtistSearchResponse = serde_json::from_value(serde_json::json!({
            "artists": {"items": [{"genres": ["synthpop", "french house"]}]}
        }))
        .unwrap();
        let first = response
            .artists
            .items
            .into_iter()
            .next()
            .and_then(|a| a.genres.into_iter().next());
        assert_eq!(first.as_deref(), Some("synthpop"));
    }
}
