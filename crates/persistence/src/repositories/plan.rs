//! Plan, subscription and profile repositories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PlanEntity, UserProfileEntity, UserSubscriptionEntity};
use crate::metrics::QueryTimer;

/// Repository for plan database operations.
#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_plan_by_id");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            SELECT * FROM plans WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<PlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_plan_by_name");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            SELECT * FROM plans WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list(&self) -> Result<Vec<PlanEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_plans");
        let result = sqlx::query_as::<_, PlanEntity>(
            r#"
            SELECT * FROM plans ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Repository for user subscription database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's most recent subscription in a feature-granting
    /// status. Older active rows win over a newer canceled one.
    pub async fn find_latest_granting(
        &self,
        user_id: &str,
    ) -> Result<Option<UserSubscriptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_latest_granting_subscription");
        let result = sqlx::query_as::<_, UserSubscriptionEntity>(
            r#"
            SELECT * FROM user_subscriptions
            WHERE user_id = $1 AND status IN ('active', 'trialing')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// The user's most recent subscription of any status. Used by the
    /// one-time trial guard, which blocks on any prior row.
    pub async fn find_latest_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<UserSubscriptionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_latest_subscription");
        let result = sqlx::query_as::<_, UserSubscriptionEntity>(
            r#"
            SELECT * FROM user_subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Start a trial subscription. Fails with a unique violation if the
    /// user already consumed a trial for this plan.
    pub async fn create_trial(
        &self,
        user_id: &str,
        plan_id: Uuid,
        trial_ends_at: DateTime<Utc>,
    ) -> Result<UserSubscriptionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_trial_subscription");
        let result = sqlx::query_as::<_, UserSubscriptionEntity>(
            r#"
            INSERT INTO user_subscriptions (user_id, plan_id, status, trial_ends_at)
            VALUES ($1, $2, 'trialing', $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(trial_ends_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Expire trials whose end date has passed. Returns how many rows
    /// moved to canceled.
    pub async fn expire_lapsed_trials(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_lapsed_trials");
        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions SET status = 'canceled', updated_at = NOW()
            WHERE status = 'trialing' AND trial_ends_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await
        .map(|done| done.rows_affected());
        timer.record();
        result
    }
}

/// Repository for user profile database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    pool: PgPool,
}

impl UserProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<UserProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_user");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            SELECT * FROM user_profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update branding fields on a profile, creating the row if needed.
    pub async fn upsert_branding(
        &self,
        user_id: &str,
        branding_name: Option<&str>,
        branding_logo_url: Option<&str>,
    ) -> Result<UserProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_profile_branding");
        let result = sqlx::query_as::<_, UserProfileEntity>(
            r#"
            INSERT INTO user_profiles (user_id, branding_name, branding_logo_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                branding_name = COALESCE($2, user_profiles.branding_name),
                branding_logo_url = COALESCE($3, user_profiles.branding_logo_url)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(branding_name)
        .bind(branding_logo_url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
