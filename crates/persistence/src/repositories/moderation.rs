//! Moderation queue and action log repositories.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ModerationActionEntity, ModerationQueueEntity, PhotoEntity};
use crate::metrics::QueryTimer;

/// Repository for moderation queue database operations.
#[derive(Clone)]
pub struct ModerationQueueRepository {
    pool: PgPool,
}

impl ModerationQueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the queue entry for a photo.
    pub async fn find_by_photo_id(
        &self,
        photo_id: Uuid,
    ) -> Result<Option<ModerationQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_queue_entry_by_photo");
        let result = sqlx::query_as::<_, ModerationQueueEntity>(
            r#"
            SELECT * FROM moderation_queues WHERE photo_id = $1
            "#,
        )
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending entries that still need an AI pass: unprocessed with no
    /// suggestion recorded. Oldest first so the queue drains in arrival
    /// order.
    pub async fn find_needing_analysis(
        &self,
        event_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ModerationQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_queue_entries_needing_analysis");
        let result = sqlx::query_as::<_, ModerationQueueEntity>(
            r#"
            SELECT q.* FROM moderation_queues q
            JOIN photos p ON p.id = q.photo_id
            WHERE p.event_id = $1
              AND q.processed = false
              AND q.gemini_suggestion IS NULL
            ORDER BY q.queued_at ASC
            LIMIT $2
            "#,
        )
        .bind(event_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All unprocessed entries for an event with their photos, oldest
    /// first. This is the moderator's review view.
    pub async fn find_pending_with_photos(
        &self,
        event_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<(ModerationQueueEntity, PhotoEntity)>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_queue_with_photos");
        let result = async {
            let entries = sqlx::query_as::<_, ModerationQueueEntity>(
                r#"
                SELECT q.* FROM moderation_queues q
                JOIN photos p ON p.id = q.photo_id
                WHERE p.event_id = $1 AND q.processed = false
                ORDER BY q.queued_at ASC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(event_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            let mut joined = Vec::with_capacity(entries.len());
            for entry in entries {
                let photo = sqlx::query_as::<_, PhotoEntity>(
                    r#"
                    SELECT * FROM photos WHERE id = $1
                    "#,
                )
                .bind(entry.photo_id)
                .fetch_one(&self.pool)
                .await?;
                joined.push((entry, photo));
            }
            Ok(joined)
        }
        .await;
        timer.record();
        result
    }

    /// Count unprocessed entries for an event.
    pub async fn count_pending(&self, event_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pending_queue_entries");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM moderation_queues q
            JOIN photos p ON p.id = q.photo_id
            WHERE p.event_id = $1 AND q.processed = false
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Record an analysis result that did not resolve the entry: a
    /// below-threshold suggestion or an error. The entry stays
    /// unprocessed for manual review.
    pub async fn record_analysis(
        &self,
        id: Uuid,
        suggestion: Option<&str>,
        confidence: Option<f32>,
        error_message: Option<&str>,
    ) -> Result<Option<ModerationQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("record_queue_analysis");
        let result = sqlx::query_as::<_, ModerationQueueEntity>(
            r#"
            UPDATE moderation_queues SET
                gemini_suggestion = $2,
                confidence_score = $3,
                error_message = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(suggestion)
        .bind(confidence)
        .bind(error_message)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Repository for the append-only moderation action log.
#[derive(Clone)]
pub struct ModerationActionRepository {
    pool: PgPool,
}

impl ModerationActionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Action history for a photo, newest first.
    pub async fn find_by_photo_id(
        &self,
        photo_id: Uuid,
    ) -> Result<Vec<ModerationActionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_actions_by_photo");
        let result = sqlx::query_as::<_, ModerationActionEntity>(
            r#"
            SELECT * FROM moderation_actions
            WHERE photo_id = $1
            ORDER BY actioned_at DESC
            "#,
        )
        .bind(photo_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
