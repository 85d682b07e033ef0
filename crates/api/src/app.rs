use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, optional_user_auth, require_admin_auth,
    require_user_auth, security_headers_middleware, trace_id,
};
use crate::routes::{admin, events, features, health, jukebox, moderation, music, photos};
use crate::services::credentials::CredentialsResolver;
use crate::services::{GeminiClient, MusicSearchClient, PhotoAnalyzer};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// AI analyzer for queued photos. Resolves its API key per request;
    /// with no key anywhere, analysis records soft failures and leaves
    /// photos pending. Absent only when the HTTP client fails to build.
    pub moderation_client: Option<Arc<dyn PhotoAnalyzer>>,
    /// Track search bridge, same per-request credential resolution.
    pub music_client: Option<Arc<MusicSearchClient>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let credentials = CredentialsResolver::new(pool.clone(), config.clone());

    let moderation_client: Option<Arc<dyn PhotoAnalyzer>> =
        match GeminiClient::new(credentials.clone(), config.moderation.clone()) {
            Some(client) => Some(Arc::new(client)),
            None => {
                warn!("Failed to build moderation HTTP client, photo analysis disabled");
                None
            }
        };

    let music_client = match MusicSearchClient::new(credentials, config.music.timeout_ms) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Failed to build music search client");
            None
        }
    };

    build_app(config, pool, moderation_client, music_client)
}

/// Router with a caller-supplied photo analyzer in place of the Gemini
/// client. Lets test builds script analysis outcomes.
pub fn create_app_with_analyzer(
    config: Config,
    pool: PgPool,
    analyzer: Arc<dyn PhotoAnalyzer>,
) -> Router {
    let config = Arc::new(config);
    let credentials = CredentialsResolver::new(pool.clone(), config.clone());
    let music_client = MusicSearchClient::new(credentials, config.music.timeout_ms)
        .ok()
        .map(Arc::new);
    build_app(config, pool, Some(analyzer), music_client)
}

fn build_app(
    config: Arc<Config>,
    pool: PgPool,
    moderation_client: Option<Arc<dyn PhotoAnalyzer>>,
    music_client: Option<Arc<MusicSearchClient>>,
) -> Router {
    let state = AppState {
        pool,
        config: config.clone(),
        moderation_client,
        music_client,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Guest routes: reachable anonymously, but an Authorization header
    // attributes the action to the caller when present.
    let guest_routes = Router::new()
        .route("/api/v1/events/:code", get(events::get_event))
        .route("/api/v1/events/:code/photos", post(photos::register_photo))
        .route("/api/v1/events/:code/photos", get(photos::list_photos))
        .route("/api/v1/events/:code/branding", get(features::get_event_branding))
        .route("/api/v1/events/:code/jukebox", get(jukebox::get_jukebox))
        .route(
            "/api/v1/events/:code/jukebox/queue",
            post(jukebox::add_track),
        )
        .route(
            "/api/v1/events/:code/jukebox/queue/:item_id/vote",
            post(jukebox::vote),
        )
        .route("/api/v1/music/search", post(music::music_search))
        .route(
            "/api/v1/moderation/analyze-photo",
            post(moderation::analyze_photo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_user_auth,
        ));

    // Organizer routes (require JWT user authentication)
    let protected_routes = Router::new()
        .route("/api/v1/events", post(events::create_event))
        .route("/api/v1/events", get(events::list_my_events))
        .route("/api/v1/events/:code", delete(events::deactivate_event))
        .route(
            "/api/v1/events/:code/moderation/queue",
            get(moderation::get_queue),
        )
        .route(
            "/api/v1/events/:code/moderation/analyze",
            post(moderation::analyze_queue),
        )
        .route(
            "/api/v1/photos/:photo_id/moderate",
            post(moderation::moderate_photo),
        )
        .route(
            "/api/v1/events/:code/jukebox/settings",
            put(jukebox::update_settings),
        )
        .route(
            "/api/v1/events/:code/jukebox/queue/:item_id/played",
            post(jukebox::mark_played),
        )
        .route(
            "/api/v1/events/:code/jukebox/queue/:item_id",
            delete(jukebox::remove_track),
        )
        .route("/api/v1/features", get(features::get_features))
        .route("/api/v1/features/check", get(features::check_feature))
        .route("/api/v1/features/trial", post(features::activate_trial))
        .route("/api/v1/features/branding", put(features::update_branding))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Admin routes (require admin-role JWT)
    let admin_routes = Router::new()
        .route("/api/v1/admin/config", get(admin::list_config))
        .route("/api/v1/admin/config/:key", get(admin::get_config))
        .route("/api/v1/admin/config/:key", put(admin::upsert_config))
        .route("/api/v1/admin/config/:key", delete(admin::delete_config))
        .route(
            "/api/v1/admin/events/:code/moderation/retry",
            post(moderation::retry_failed),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(guest_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
