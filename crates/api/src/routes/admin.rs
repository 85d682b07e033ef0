//! Admin configuration endpoint handlers.
//!
//! Key/value settings tunable at runtime by administrators, such as the
//! moderation model name or prompt overrides. All routes here sit behind
//! admin auth.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use persistence::entities::AdminConfigEntity;
use persistence::repositories::AdminConfigRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::UserAuth;

/// A single admin configuration entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminConfigResponse {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl From<AdminConfigEntity> for AdminConfigResponse {
    fn from(entity: AdminConfigEntity) -> Self {
        Self {
            key: entity.key,
            value: entity.value,
            updated_by: entity.updated_by,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminConfigListResponse {
    pub entries: Vec<AdminConfigResponse>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpsertConfigRequest {
    pub value: serde_json::Value,
}

/// List all configuration entries.
///
/// GET /api/v1/admin/config
pub async fn list_config(
    State(state): State<AppState>,
) -> Result<Json<AdminConfigListResponse>, ApiError> {
    let repo = AdminConfigRepository::new(state.pool.clone());
    let entries: Vec<AdminConfigResponse> = repo
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let total = entries.len();
    Ok(Json(AdminConfigListResponse { entries, total }))
}

/// Fetch one configuration entry by key.
///
/// GET /api/v1/admin/config/:key
pub async fn get_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<AdminConfigResponse>, ApiError> {
    let repo = AdminConfigRepository::new(state.pool.clone());
    let entry = repo
        .find_by_key(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Config entry not found".to_string()))?;
    Ok(Json(entry.into()))
}

/// Create or replace a configuration entry.
///
/// PUT /api/v1/admin/config/:key
pub async fn upsert_config(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(key): Path<String>,
    Json(request): Json<UpsertConfigRequest>,
) -> Result<Json<AdminConfigResponse>, ApiError> {
    if key.is_empty() || key.len() > 100 {
        return Err(ApiError::Validation(
            "Config key must be 1-100 characters".to_string(),
        ));
    }

    let repo = AdminConfigRepository::new(state.pool.clone());
    let entry = repo.upsert(&key, &request.value, &auth.user_id).await?;

    info!(key = %key, updated_by = %auth.user_id, "Admin config updated");
    Ok(Json(entry.into()))
}

/// Delete a configuration entry.
///
/// DELETE /api/v1/admin/config/:key
pub async fn delete_config(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let repo = AdminConfigRepository::new(state.pool.clone());
    let deleted = repo.delete(&key).await?;
    if !deleted {
        return Err(ApiError::NotFound("Config entry not found".to_string()));
    }

    info!(key = %key, deleted_by = %auth.user_id, "Admin config deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_response_from_entity() {
        let entity = AdminConfigEntity {
            key: "moderation.model".to_string(),
            value: serde_json::json!("gemini-2.0-flash"),
            updated_by: "admin-1".to_string(),
            updated_at: Utc::now(),
        };
        let response = AdminConfigResponse::from(entity);
        assert_eq!(response.key, "moderation.model");
        assert_eq!(response.value, serde_json::json!("gemini-2.0-flash"));
        assert_eq!(response.updated_by, "admin-1");
    }

    #[test]
    fn test_upsert_request_accepts_structured_values() {
        let request: UpsertConfigRequest = serde_json::from_value(serde_json::json!({
            "value": {"threshold": 0.9, "enabled": true}
        }))
        .unwrap();
        assert_eq!(request.value["threshold"], serde_json::json!(0.9));
    }
}
