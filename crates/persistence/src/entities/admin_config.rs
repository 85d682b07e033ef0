//! Admin configuration entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the admin_config table. Key/value rows with
/// JSONB values, used for operator-tunable settings such as the AI model
/// name and prompt overrides.
#[derive(Debug, Clone, FromRow)]
pub struct AdminConfigEntity {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_config_entity_clone() {
        let entity = AdminConfigEntity {
            key: "moderation.model".to_string(),
            value: serde_json::json!("gemini-2.0-flash"),
            updated_by: "admin-1".to_string(),
            updated_at: Utc::now(),
        };
        let cloned = entity.clone();
        assert_eq!(cloned.key, entity.key);
        assert_eq!(cloned.value, entity.value);
    }
}
