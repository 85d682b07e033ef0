//! Photo repository for database operations.
//!
//! Also owns the cross-table moderation writes. Registering a photo for
//! a moderated event inserts the photo and its queue entry in one
//! transaction, and resolving a photo updates the photo, the queue entry
//! and the action log atomically so a crash can never leave a resolved
//! photo without an audit row.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::moderation::ModerationAction;

use crate::entities::{ModerationQueueEntity, PhotoEntity};
use crate::metrics::QueryTimer;

/// Repository for photo-related database operations.
#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

/// Inputs for resolving one photo's moderation state.
#[derive(Debug, Clone)]
pub struct ModerationResolution {
    pub photo_id: Uuid,
    /// New photo status, `approved` or `rejected`.
    pub new_status: String,
    /// AI suggestion to record on the queue entry, if this resolution
    /// came out of an analysis pass.
    pub suggestion: Option<String>,
    pub confidence: Option<f32>,
    pub action: ModerationAction,
}

impl PhotoRepository {
    /// Creates a new PhotoRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a photo with the given initial status. Used for
    /// unmoderated events where photos are approved on arrival.
    pub async fn create(
        &self,
        event_id: Uuid,
        storage_path: &str,
        storage_url: Option<&str>,
        caption: Option<&str>,
        status: &str,
        uploaded_by: &str,
    ) -> Result<PhotoEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_photo");
        let result = sqlx::query_as::<_, PhotoEntity>(
            r#"
            INSERT INTO photos (event_id, storage_path, storage_url, caption, status, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(storage_path)
        .bind(storage_url)
        .bind(caption)
        .bind(status)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Register a pending photo and enqueue it for moderation in one
    /// transaction.
    pub async fn create_with_queue_entry(
        &self,
        event_id: Uuid,
        storage_path: &str,
        storage_url: Option<&str>,
        caption: Option<&str>,
        uploaded_by: &str,
    ) -> Result<(PhotoEntity, ModerationQueueEntity), sqlx::Error> {
        let timer = QueryTimer::new("create_photo_with_queue_entry");
        let result = async {
            let mut tx = self.pool.begin().await?;

            let photo = sqlx::query_as::<_, PhotoEntity>(
                r#"
                INSERT INTO photos (event_id, storage_path, storage_url, caption, status, uploaded_by)
                VALUES ($1, $2, $3, $4, 'pending', $5)
                RETURNING *
                "#,
            )
            .bind(event_id)
            .bind(storage_path)
            .bind(storage_url)
            .bind(caption)
            .bind(uploaded_by)
            .fetch_one(&mut *tx)
            .await?;

            let entry = sqlx::query_as::<_, ModerationQueueEntity>(
                r#"
                INSERT INTO moderation_queues (photo_id)
                VALUES ($1)
                RETURNING *
                "#,
            )
            .bind(photo.id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok((photo, entry))
        }
        .await;
        timer.record();
        result
    }

    /// Find a photo by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PhotoEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_photo_by_id");
        let result = sqlx::query_as::<_, PhotoEntity>(
            r#"
            SELECT * FROM photos WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List photos for an event with the given status, newest first.
    pub async fn find_by_event_and_status(
        &self,
        event_id: Uuid,
        status: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PhotoEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_photos_by_event_and_status");
        let result = sqlx::query_as::<_, PhotoEntity>(
            r#"
            SELECT * FROM photos
            WHERE event_id = $1 AND status = $2
            ORDER BY uploaded_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(event_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count photos for an event with the given status.
    pub async fn count_by_event_and_status(
        &self,
        event_id: Uuid,
        status: &str,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_photos_by_event_and_status");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM photos WHERE event_id = $1 AND status = $2
            "#,
        )
        .bind(event_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        timer.record();
        Ok(count.0)
    }

    /// Resolve a photo's moderation state atomically: photo status, queue
    /// entry and action log move together or not at all.
    ///
    /// Returns the updated photo, or `None` if the photo no longer
    /// exists.
    pub async fn resolve_moderation(
        &self,
        resolution: &ModerationResolution,
    ) -> Result<Option<PhotoEntity>, sqlx::Error> {
        let timer = QueryTimer::new("resolve_photo_moderation");
        let result = async {
            let mut tx = self.pool.begin().await?;

            let photo = sqlx::query_as::<_, PhotoEntity>(
                r#"
                UPDATE photos SET status = $2 WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(resolution.photo_id)
            .bind(&resolution.new_status)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(photo) = photo else {
                tx.rollback().await?;
                return Ok(None);
            };

            sqlx::query(
                r#"
                UPDATE moderation_queues SET
                    processed = true,
                    gemini_suggestion = COALESCE($2, gemini_suggestion),
                    confidence_score = COALESCE($3, confidence_score),
                    error_message = NULL
                WHERE photo_id = $1
                "#,
            )
            .bind(resolution.photo_id)
            .bind(&resolution.suggestion)
            .bind(resolution.confidence)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO moderation_actions (id, photo_id, moderator_id, action, reason, actioned_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(resolution.action.id)
            .bind(resolution.action.photo_id)
            .bind(&resolution.action.moderator_id)
            .bind(resolution.action.action.as_str())
            .bind(&resolution.action.reason)
            .bind(resolution.action.actioned_at)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(Some(photo))
        }
        .await;
        timer.record();
        result
    }
}
