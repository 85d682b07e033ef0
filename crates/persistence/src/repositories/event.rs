//! Event repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EventEntity;
use crate::metrics::QueryTimer;

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event. Fails with a unique violation if the code is
    /// already taken; callers regenerate and retry.
    pub async fn create(
        &self,
        code: &str,
        creator_id: &str,
        moderation_enabled: bool,
        expires_at: DateTime<Utc>,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (code, creator_id, moderation_enabled, status, expires_at)
            VALUES ($1, $2, $3, 'active', $4)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(creator_id)
        .bind(moderation_enabled)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event by its join code. Deactivated events do not
    /// resolve; time-based expiry is a read-time predicate and is
    /// judged by callers.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_code");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events WHERE code = $1 AND status = 'active'
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List events created by a user, newest first.
    pub async fn find_by_creator(
        &self,
        creator_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_events_by_creator");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT * FROM events
            WHERE creator_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(creator_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark an event expired. Expiry is normally derived from
    /// `expires_at` at read time; this records an explicit deactivation.
    pub async fn deactivate(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_event");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            UPDATE events SET status = 'expired' WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
