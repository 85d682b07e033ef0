//! Feature entitlement resolution.
//!
//! Precedence: an active or trialing subscription's plan wins, then a
//! plan assigned directly on the user profile, then the built-in
//! defaults. Lookup failures upstream should surface as the defaults
//! rather than an error, so anonymous guests always resolve.

use crate::models::{Branding, Plan, PlanFeatures, UserProfile, UserSubscription};

/// Product name shown when white-label branding is not entitled.
pub const DEFAULT_BRANDING_NAME: &str = "EventSnaps";

/// The resolved entitlements plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFeatures {
    pub features: PlanFeatures,
    pub plan_name: Option<String>,
}

impl ResolvedFeatures {
    fn defaults() -> Self {
        Self {
            features: PlanFeatures::default(),
            plan_name: None,
        }
    }

    fn from_plan(plan: &Plan) -> Self {
        Self {
            features: plan.features.clone(),
            plan_name: Some(plan.name.clone()),
        }
    }
}

/// Resolve the feature set for a user from whatever rows were found.
///
/// `subscription_plan` must be the plan of a subscription whose status
/// grants features; callers filter on status before the plan lookup.
pub fn resolve(
    subscription: Option<(&UserSubscription, &Plan)>,
    profile_plan: Option<&Plan>,
) -> ResolvedFeatures {
    if let Some((subscription, plan)) = subscription {
        if subscription.status.grants_features() {
            return ResolvedFeatures::from_plan(plan);
        }
    }
    if let Some(plan) = profile_plan {
        return ResolvedFeatures::from_plan(plan);
    }
    ResolvedFeatures::defaults()
}

/// Resolve branding from the profile and entitlements. Branding fields
/// only apply when the white-label feature is on; otherwise the product
/// defaults are returned so expired plans cannot keep custom branding.
pub fn resolve_branding(profile: Option<&UserProfile>, features: &PlanFeatures) -> Branding {
    if features.white_label {
        if let Some(profile) = profile {
            if let Some(name) = &profile.branding_name {
                return Branding {
                    name: name.clone(),
                    logo_url: profile.branding_logo_url.clone(),
                    white_label: true,
                };
            }
        }
    }
    Branding {
        name: DEFAULT_BRANDING_NAME.to_string(),
        logo_url: None,
        white_label: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn plan(name: &str, gallery: bool) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            name: name.to_string(),
            features: PlanFeatures {
                gallery,
                ..PlanFeatures::default()
            },
            trial_days: Some(14),
            created_at: Utc::now(),
        }
    }

    fn subscription(plan_id: Uuid, status: SubscriptionStatus) -> UserSubscription {
        UserSubscription {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            plan_id,
            status,
            trial_ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn profile(branding_name: Option<&str>) -> UserProfile {
        UserProfile {
            user_id: "user-1".to_string(),
            plan_id: None,
            branding_name: branding_name.map(str::to_string),
            branding_logo_url: Some("https://cdn.example.com/logo.png".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_subscription_plan_wins_over_profile_plan() {
        let sub_plan = plan("pro", true);
        let profile_plan = plan("starter", false);
        let sub = subscription(sub_plan.id, SubscriptionStatus::Active);
        let resolved = resolve(Some((&sub, &sub_plan)), Some(&profile_plan));
        assert_eq!(resolved.plan_name.as_deref(), Some("pro"));
        assert!(resolved.features.gallery);
    }

    #[test]
    fn test_trialing_subscription_grants() {
        let sub_plan = plan("pro", true);
        let sub = subscription(sub_plan.id, SubscriptionStatus::Trialing);
        let resolved = resolve(Some((&sub, &sub_plan)), None);
        assert_eq!(resolved.plan_name.as_deref(), Some("pro"));
    }

    #[test]
    fn test_canceled_subscription_falls_through_to_profile() {
        let sub_plan = plan("pro", true);
        let profile_plan = plan("starter", false);
        let sub = subscription(sub_plan.id, SubscriptionStatus::Canceled);
        let resolved = resolve(Some((&sub, &sub_plan)), Some(&profile_plan));
        assert_eq!(resolved.plan_name.as_deref(), Some("starter"));
    }

    #[test]
    fn test_no_rows_resolves_defaults() {
        let resolved = resolve(None, None);
        assert_eq!(resolved.plan_name, None);
        assert_eq!(resolved.features, PlanFeatures::default());
        assert!(resolved.features.playlist);
        assert!(!resolved.features.gallery);
    }

    #[test]
    fn test_branding_requires_white_label() {
        let profile = profile(Some("Acme Weddings"));
        let no_wl = PlanFeatures::default();
        let branding = resolve_branding(Some(&profile), &no_wl);
        assert_eq!(branding.name, DEFAULT_BRANDING_NAME);
        assert!(!branding.white_label);

        let wl = PlanFeatures {
            white_label: true,
            ..PlanFeatures::default()
        };
        let branding = resolve_branding(Some(&profile), &wl);
        assert_eq!(branding.name, "Acme Weddings");
        assert!(branding.white_label);
    }

    #[test]
    fn test_branding_without_name_uses_defaults() {
        let profile = profile(None);
        let wl = PlanFeatures {
            white_label: true,
            ..PlanFeatures::default()
        };
        let branding = resolve_branding(Some(&profile), &wl);
        assert_eq!(branding.name, DEFAULT_BRANDING_NAME);
    }
}
