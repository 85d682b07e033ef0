//! Plan, subscription and profile entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::plan::{
    Plan, PlanFeatures, SubscriptionStatus, UserProfile, UserSubscription,
};

/// Database row mapping for the plans table. Features are stored as a
/// JSONB document so new flags can ship without a migration.
#[derive(Debug, Clone, FromRow)]
pub struct PlanEntity {
    pub id: Uuid,
    pub name: String,
    pub features: serde_json::Value,
    pub trial_days: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<PlanEntity> for Plan {
    fn from(entity: PlanEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            features: serde_json::from_value(entity.features).unwrap_or_default(),
            trial_days: entity.trial_days,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the user_subscriptions table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSubscriptionEntity {
    pub id: Uuid,
    pub user_id: String,
    pub plan_id: Uuid,
    pub status: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserSubscriptionEntity> for UserSubscription {
    fn from(entity: UserSubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            status: SubscriptionStatus::parse(&entity.status)
                .unwrap_or(SubscriptionStatus::Canceled),
            trial_ends_at: entity.trial_ends_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the user_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfileEntity {
    pub user_id: String,
    pub plan_id: Option<Uuid>,
    pub branding_name: Option<String>,
    pub branding_logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfileEntity> for UserProfile {
    fn from(entity: UserProfileEntity) -> Self {
        Self {
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            branding_name: entity.branding_name,
            branding_logo_url: entity.branding_logo_url,
            created_at: entity.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_entity_to_domain() {
        let entity = PlanEntity {
            id: Uuid::new_v4(),
            name: "pro".to_string(),
            features: serde_json::json!({"gallery": true, "max_storage_gb": 25.0}),
            trial_days: Some(14),
            created_at: Utc::now(),
        };
        let plan: Plan = entity.clone().into();
        assert_eq!(plan.name, "pro");
        assert!(plan.features.gallery);
        assert_eq!(plan.features.max_storage_gb, 25.0);
        // Unspecified flags take the defaults.
        assert!(plan.features.playlist);
    }

    #[test]
    fn test_plan_entity_malformed_features_fall_back() {
        let entity = PlanEntity {
            id: Uuid::new_v4(),
            name: "broken".to_string(),
            features: serde_json::json!("not-an-object"),
            trial_days: None,
            created_at: Utc::now(),
        };
        let plan: Plan = entity.into();
        assert_eq!(plan.features, PlanFeatures::default());
    }

    #[test]
    fn test_subscription_entity_unknown_status_is_canceled() {
        let entity = UserSubscriptionEntity {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            plan_id: Uuid::new_v4(),
            status: "paused".to_string(),
            trial_ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let sub: UserSubscription = entity.into();
        // Unknown states must never grant features.
        assert_eq!(sub.status, SubscriptionStatus::Canceled);
        assert!(!sub.status.grants_features());
    }
}
