//! Runtime credential resolution and Spotify token management.
//!
//! Provider keys live in two places: the `admin_config` table, written
//! through the admin panel, and the process environment. The admin-set
//! value wins so operators can rotate keys without a redeploy; the
//! environment value is the fallback. Resolution happens per request,
//! which keeps a freshly saved key effective immediately.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use persistence::repositories::AdminConfigRepository;

use crate::config::Config;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this many seconds before the token actually expires.
const REFRESH_MARGIN_SECS: u64 = 60;

// admin_config keys, shared with the admin panel.
const GEMINI_API_KEY: &str = "gemini_api_key";
const SPOTIFY_CLIENT_ID: &str = "spotify_client_id";
const SPOTIFY_CLIENT_SECRET: &str = "spotify_client_secret";
const YOUTUBE_API_KEY: &str = "youtube_api_key";

/// Per-key credential lookup over `admin_config` with environment
/// fallback. Values are never logged.
#[derive(Clone)]
pub struct CredentialsResolver {
    repo: AdminConfigRepository,
    config: Arc<Config>,
}

impl CredentialsResolver {
    pub fn new(pool: PgPool, config: Arc<Config>) -> Self {
        Self {
            repo: AdminConfigRepository::new(pool),
            config,
        }
    }

    /// The admin-set value when present and non-empty, else the
    /// fallback. A lookup error also falls back, so a database blip
    /// cannot strand a deployment configured via environment.
    async fn resolve(&self, key: &str, fallback: &str) -> String {
        match self.repo.find_by_key(key).await {
            Ok(Some(entry)) => match entry.value.as_str() {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => fallback.to_string(),
            },
            Ok(None) => fallback.to_string(),
            Err(e) => {
                debug!(key = %key, error = %e, "Admin config lookup failed, using environment value");
                fallback.to_string()
            }
        }
    }

    /// Gemini API key, or an empty string when neither source has one.
    pub async fn gemini_api_key(&self) -> String {
        self.resolve(GEMINI_API_KEY, &self.config.moderation.gemini_api_key)
            .await
    }

    /// Spotify client id and secret, `None` unless both resolve.
    pub async fn spotify_credentials(&self) -> Option<(String, String)> {
        let id = self
            .resolve(SPOTIFY_CLIENT_ID, &self.config.music.spotify_client_id)
            .await;
        let secret = self
            .resolve(
                SPOTIFY_CLIENT_SECRET,
                &self.config.music.spotify_client_secret,
            )
            .await;
        if id.is_empty() || secret.is_empty() {
            return None;
        }
        Some((id, secret))
    }

    pub async fn youtube_api_key(&self) -> Option<String> {
        let key = self
            .resolve(YOUTUBE_API_KEY, &self.config.music.youtube_api_key)
            .await;
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Spotify credentials not configured")]
    NotConfigured,

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token request rejected: HTTP {0}")]
    Rejected(u16),
}

/// Client-credentials token as issued by Spotify. Serialized verbatim
/// for clients that drive the provider themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Cache for a Spotify client-credentials access token.
///
/// Credentials are supplied per call since they resolve at request
/// time; a cached token issued under rotated-out credentials simply
/// ages out within its expiry window.
pub struct SpotifyTokenCache {
    token: RwLock<Option<CachedToken>>,
}

impl SpotifyTokenCache {
    pub fn new() -> Self {
        Self {
            token: RwLock::new(None),
        }
    }

    /// Returns a valid access token, refreshing if the cached one is
    /// missing or near expiry.
    pub async fn access_token(
        &self,
        http: &Client,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, TokenError> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch_token(http, client_id, client_secret).await?;
        let lifetime = token.expires_in.saturating_sub(REFRESH_MARGIN_SECS).max(1);
        let access_token = token.access_token.clone();
        *cached = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(access_token)
    }

    /// Fetch a fresh token object without touching the cache. Used when
    /// the caller needs the full issuance payload.
    pub async fn fetch_token(
        &self,
        http: &Client,
        client_id: &str,
        client_secret: &str,
    ) -> Result<SpotifyToken, TokenError> {
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(TokenError::NotConfigured);
        }

        let response = http
            .post(SPOTIFY_TOKEN_URL)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TokenError::Rejected(response.status().as_u16()));
        }

        let token: SpotifyToken = response.json().await?;
        debug!(expires_in = token.expires_in, "Spotify token issued");
        Ok(token)
    }
}

impl Default for SpotifyTokenCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_deserializes_with_default_type() {
        let token: SpotifyToken =
            serde_json::from_str(r#"{"access_token": "abc", "expires_in": 3600}"#).unwrap();
        assert_eq!(token.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_empty_credentials_token_request_fails() {
        let cache = SpotifyTokenCache::new();
        let http = Client::new();
        let result = cache.fetch_token(&http, "", "").await;
        assert!(matches!(result, Err(TokenError::NotConfigured)));
    }
}
