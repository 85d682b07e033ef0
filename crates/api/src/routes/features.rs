//! Feature entitlement and branding endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use domain::models::{
    Branding, Feature, FeatureCheckResponse, FeaturesResponse, Plan, SubscriptionStatus,
    TrialActivationResponse, UserProfile, UserSubscription,
};
use validator::Validate;
use domain::services::feature_resolution::{self, ResolvedFeatures};
use persistence::repositories::{PlanRepository, SubscriptionRepository, UserProfileRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::UserAuth;
use crate::routes::events::find_event_by_code;

/// Resolve the feature set for a user id.
pub async fn resolve_for_user(
    state: &AppState,
    user_id: &str,
) -> Result<ResolvedFeatures, ApiError> {
    let sub_repo = SubscriptionRepository::new(state.pool.clone());
    let plan_repo = PlanRepository::new(state.pool.clone());
    let profile_repo = UserProfileRepository::new(state.pool.clone());

    let subscription: Option<UserSubscription> = sub_repo
        .find_latest_granting(user_id)
        .await?
        .map(Into::into);

    // A trial that ran past its end date no longer grants anything,
    // whatever its stored status says.
    let subscription = subscription.filter(|sub: &UserSubscription| {
        !(sub.status == SubscriptionStatus::Trialing
            && sub.trial_ends_at.is_some_and(|ends| ends <= Utc::now()))
    });

    let subscription_plan: Option<Plan> = match subscription.as_ref() {
        Some(sub) => plan_repo.find_by_id(sub.plan_id).await?.map(Into::into),
        None => None,
    };

    let profile: Option<UserProfile> = profile_repo
        .find_by_user_id(user_id)
        .await?
        .map(Into::into);

    let profile_plan: Option<Plan> = match profile.as_ref().and_then(|p| p.plan_id) {
        Some(plan_id) => plan_repo.find_by_id(plan_id).await?.map(Into::into),
        None => None,
    };

    let paired = match (subscription.as_ref(), subscription_plan.as_ref()) {
        (Some(sub), Some(plan)) => Some((sub, plan)),
        _ => None,
    };

    Ok(feature_resolution::resolve(paired, profile_plan.as_ref()))
}

/// The caller's full feature set.
///
/// GET /api/v1/features
pub async fn get_features(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    let resolved = resolve_for_user(&state, &auth.user_id).await?;
    Ok(Json(FeaturesResponse {
        features: resolved.features,
        plan_name: resolved.plan_name,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckFeatureQuery {
    pub feature: String,
}

/// Check a single feature gate for the caller.
///
/// Boolean features gate directly; the numeric storage quota always
/// answers allowed here because thresholds are enforced where bytes are
/// counted. A lookup failure fails CLOSED: the gate must never open
/// because a dependency was down.
///
/// GET /api/v1/features/check?feature=gallery
pub async fn check_feature(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Query(query): Query<CheckFeatureQuery>,
) -> Result<Json<FeatureCheckResponse>, ApiError> {
    let Some(feature) = Feature::parse(&query.feature) else {
        return Err(ApiError::Validation(format!(
            "unknown feature: {}",
            query.feature
        )));
    };

    let response = match resolve_for_user(&state, &auth.user_id).await {
        Ok(resolved) => FeatureCheckResponse {
            feature,
            allowed: resolved.features.is_allowed(feature),
            message: None,
        },
        Err(e) => {
            warn!(
                user_id = %auth.user_id,
                feature = feature.as_str(),
                error = %e,
                "Feature resolution failed, gate answers closed"
            );
            FeatureCheckResponse {
                feature,
                allowed: false,
                message: Some("Could not verify your plan. Please try again.".to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// Plan granted by the one-time trial.
const TRIAL_PLAN: &str = "trial_pro";

/// Trial length.
const TRIAL_HOURS: i64 = 24;

/// Activate the one-time trial for the caller.
///
/// Any pre-existing subscription row, whatever its status, blocks the
/// trial. "Already used" is a business outcome and answers 200 with
/// `activated: false` rather than an error status.
///
/// POST /api/v1/features/trial
pub async fn activate_trial(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
) -> Result<Json<TrialActivationResponse>, ApiError> {
    let sub_repo = SubscriptionRepository::new(state.pool.clone());
    if sub_repo.find_latest_by_user(&auth.user_id).await?.is_some() {
        return Ok(Json(TrialActivationResponse {
            activated: false,
            message: Some("You already have or had a subscription.".to_string()),
        }));
    }

    let plan_repo = PlanRepository::new(state.pool.clone());
    let plan: Plan = plan_repo
        .find_by_name(TRIAL_PLAN)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Plan {} is not seeded", TRIAL_PLAN)))?
        .into();

    let trial_ends_at = Utc::now() + Duration::hours(TRIAL_HOURS);
    // Racing activations collapse on the (user_id, plan_id) unique
    // constraint; report the loser as already-used.
    match sub_repo
        .create_trial(&auth.user_id, plan.id, trial_ends_at)
        .await
        .map_err(ApiError::from)
    {
        Ok(_) => {}
        Err(ApiError::Conflict(_)) => {
            return Ok(Json(TrialActivationResponse {
                activated: false,
                message: Some("You already have or had a subscription.".to_string()),
            }));
        }
        Err(other) => return Err(other),
    }

    info!(user_id = %auth.user_id, plan = %plan.name, "Trial activated");
    Ok(Json(TrialActivationResponse {
        activated: true,
        message: None,
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateBrandingRequest {
    #[validate(length(min = 1, max = 100))]
    pub branding_name: Option<String>,
    #[validate(url)]
    pub branding_logo_url: Option<String>,
}

/// Store branding for the caller's profile. The stored values only
/// show once white-label is entitled.
///
/// PUT /api/v1/features/branding
pub async fn update_branding(
    State(state): State<AppState>,
    Extension(auth): Extension<UserAuth>,
    Json(request): Json<UpdateBrandingRequest>,
) -> Result<Json<Branding>, ApiError> {
    request.validate()?;

    let profile_repo = UserProfileRepository::new(state.pool.clone());
    let profile: UserProfile = profile_repo
        .upsert_branding(
            &auth.user_id,
            request.branding_name.as_deref(),
            request.branding_logo_url.as_deref(),
        )
        .await?
        .into();

    let resolved = resolve_for_user(&state, &auth.user_id).await?;
    let branding = feature_resolution::resolve_branding(Some(&profile), &resolved.features);
    Ok(Json(branding))
}

/// Branding shown on an event's public pages, resolved from the event
/// creator's entitlements.
///
/// GET /api/v1/events/:code/branding
pub async fn get_event_branding(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Branding>, ApiError> {
    let event = find_event_by_code(&state, &code).await?;

    let resolved = resolve_for_user(&state, &event.creator_id).await?;
    let profile_repo = UserProfileRepository::new(state.pool.clone());
    let profile: Option<UserProfile> = profile_repo
        .find_by_user_id(&event.creator_id)
        .await?
        .map(Into::into);

    let branding = feature_resolution::resolve_branding(profile.as_ref(), &resolved.features);
    Ok(Json(branding))
}
