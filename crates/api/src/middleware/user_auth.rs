//! User JWT authentication middleware.
//!
//! Tokens are issued by the external identity provider; this service
//! only validates them. Guest flows (joining an event, uploading a
//! photo, voting) use `optional_user_auth` and fall back to the
//! anonymous identity.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use domain::models::ANONYMOUS_USER;
use shared::jwt::{JwtConfig, UserRole};

/// Authenticated user information extracted from JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: String,
    /// Role granted by the identity provider.
    pub role: UserRole,
    /// JWT ID (jti) for session tracking.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns user authentication info.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        if claims.sub.is_empty() {
            return Err("Empty subject in token".to_string());
        }

        Ok(UserAuth {
            user_id: claims.sub,
            role: claims.role,
            jti: claims.jti,
        })
    }

    /// Creates a JwtConfig from JwtAuthConfig.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
        JwtConfig::with_leeway(
            &config.private_key,
            &config.public_key,
            config.access_token_expiry_secs,
            config.leeway_secs,
        )
        .map_err(|e| format!("Failed to initialize JWT config: {}", e))
    }
}

/// The acting identity for a request: the authenticated user id, or the
/// anonymous sentinel when the caller is an unauthenticated guest.
pub fn acting_user_id(auth: Option<&UserAuth>) -> &str {
    auth.map(|a| a.user_id.as_str()).unwrap_or(ANONYMOUS_USER)
}

/// Middleware that requires JWT user authentication.
///
/// Validates the Bearer token in the Authorization header and rejects
/// requests without a valid JWT. Authenticated user information is
/// stored in request extensions for downstream handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let jwt_config = match UserAuth::create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return internal_error_response("Authentication service unavailable");
        }
    };

    match UserAuth::validate(&jwt_config, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Middleware that requires an admin-role JWT.
pub async fn require_admin_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let jwt_config = match UserAuth::create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return internal_error_response("Authentication service unavailable");
        }
    };

    match UserAuth::validate(&jwt_config, token) {
        Ok(auth) if auth.role.is_admin() => {
            let mut req = req;
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Ok(_) => forbidden_response("Admin role required"),
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Middleware that optionally validates JWT user authentication.
///
/// Attempts to validate the Bearer token if present, but allows the
/// request to proceed even without authentication. Guest endpoints use
/// this so authenticated organizers and anonymous guests share routes.
pub async fn optional_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    if let Some(header) = auth_header {
        if let Some(token) = header.strip_prefix("Bearer ") {
            if let Ok(jwt_config) = UserAuth::create_jwt_config(&state.config.jwt) {
                if let Ok(auth) = UserAuth::validate(&jwt_config, token) {
                    req.extensions_mut().insert(auth);
                }
            }
        }
    }

    next.run(req).await
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
        .into_response()
}

fn forbidden_response(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message,
        })),
    )
        .into_response()
}

fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acting_user_id_anonymous() {
        assert_eq!(acting_user_id(None), "anonymous");
    }

    #[test]
    fn test_acting_user_id_authenticated() {
        let auth = UserAuth {
            user_id: "user-42".to_string(),
            role: UserRole::User,
            jti: "jti".to_string(),
        };
        assert_eq!(acting_user_id(Some(&auth)), "user-42");
    }
}
