//! Plans, subscriptions and feature entitlements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feature set attached to a plan. Unknown users fall back to
/// [`PlanFeatures::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlanFeatures {
    #[serde(default)]
    pub gallery: bool,
    #[serde(default = "default_true")]
    pub playlist: bool,
    #[serde(default)]
    pub tv_mode: bool,
    #[serde(default)]
    pub white_label: bool,
    #[serde(default = "default_storage_gb")]
    pub max_storage_gb: f64,
}

fn default_true() -> bool {
    true
}

fn default_storage_gb() -> f64 {
    0.5
}

impl Default for PlanFeatures {
    fn default() -> Self {
        Self {
            gallery: false,
            playlist: true,
            tv_mode: false,
            white_label: false,
            max_storage_gb: 0.5,
        }
    }
}

/// A feature a client can ask about by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Gallery,
    Playlist,
    TvMode,
    WhiteLabel,
    MaxStorageGb,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Gallery => "gallery",
            Feature::Playlist => "playlist",
            Feature::TvMode => "tv_mode",
            Feature::WhiteLabel => "white_label",
            Feature::MaxStorageGb => "max_storage_gb",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gallery" => Some(Feature::Gallery),
            "playlist" => Some(Feature::Playlist),
            "tv_mode" => Some(Feature::TvMode),
            "white_label" => Some(Feature::WhiteLabel),
            "max_storage_gb" => Some(Feature::MaxStorageGb),
            _ => None,
        }
    }
}

impl PlanFeatures {
    /// Whether a feature gate opens for this plan. Boolean flags gate
    /// directly; the numeric storage quota always passes at this layer,
    /// threshold enforcement happens where bytes are counted.
    pub fn is_allowed(&self, feature: Feature) -> bool {
        match feature {
            Feature::Gallery => self.gallery,
            Feature::Playlist => self.playlist,
            Feature::TvMode => self.tv_mode,
            Feature::WhiteLabel => self.white_label,
            Feature::MaxStorageGb => true,
        }
    }
}

/// A purchasable plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub features: PlanFeatures,
    pub trial_days: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a subscription. Only `Active` and `Trialing`
/// grant the plan's features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SubscriptionStatus::Active),
            "trialing" => Some(SubscriptionStatus::Trialing),
            "past_due" => Some(SubscriptionStatus::PastDue),
            "canceled" => Some(SubscriptionStatus::Canceled),
            _ => None,
        }
    }

    /// Whether this status entitles the user to the plan's features.
    pub fn grants_features(self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing
        )
    }
}

/// A user's subscription to a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserSubscription {
    pub id: Uuid,
    pub user_id: String,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user profile row. Carries a direct plan assignment used when no
/// subscription applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserProfile {
    pub user_id: String,
    pub plan_id: Option<Uuid>,
    pub branding_name: Option<String>,
    pub branding_logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response for a single feature check. `message` carries the retry
/// hint when the gate fails closed on a resolution error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FeatureCheckResponse {
    pub feature: Feature,
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of a trial activation attempt. "Already used" is a business
/// outcome, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrialActivationResponse {
    pub activated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for the full feature set of the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FeaturesResponse {
    pub features: PlanFeatures,
    /// Plan name when one resolved, absent for the built-in defaults.
    pub plan_name: Option<String>,
}

/// White-label branding as shown on event pages. Falls back to product
/// defaults when the feature is not entitled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Branding {
    pub name: String,
    pub logo_url: Option<String>,
    pub white_label: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_features() {
        let features = PlanFeatures::default();
        assert!(!features.gallery);
        assert!(features.playlist);
        assert!(!features.tv_mode);
        assert!(!features.white_label);
        assert_eq!(features.max_storage_gb, 0.5);
    }

    #[test]
    fn test_features_deserialize_fills_defaults() {
        // Plans stored with sparse feature JSON still deserialize.
        let features: PlanFeatures = serde_json::from_str(r#"{"gallery": true}"#).unwrap();
        assert!(features.gallery);
        assert!(features.playlist);
        assert_eq!(features.max_storage_gb, 0.5);
    }

    #[test]
    fn test_status_grants_features() {
        assert!(SubscriptionStatus::Active.grants_features());
        assert!(SubscriptionStatus::Trialing.grants_features());
        assert!(!SubscriptionStatus::PastDue.grants_features());
        assert!(!SubscriptionStatus::Canceled.grants_features());
    }

    #[test]
    fn test_feature_parse() {
        assert_eq!(Feature::parse("tv_mode"), Some(Feature::TvMode));
        assert_eq!(Feature::parse("max_storage_gb"), Some(Feature::MaxStorageGb));
        assert_eq!(Feature::parse("unknown"), None);
    }

    #[test]
    fn test_is_allowed_matches_fields() {
        let features = PlanFeatures {
            gallery: true,
            playlist: false,
            tv_mode: true,
            white_label: false,
            max_storage_gb: 10.0,
        };
        assert!(features.is_allowed(Feature::Gallery));
        assert!(!features.is_allowed(Feature::Playlist));
        assert!(features.is_allowed(Feature::TvMode));
        assert!(!features.is_allowed(Feature::WhiteLabel));
    }

    #[test]
    fn test_numeric_feature_always_allowed() {
        let features = PlanFeatures::default();
        assert!(features.is_allowed(Feature::MaxStorageGb));
    }
}
