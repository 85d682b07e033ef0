//! Jukebox settings and queue repositories.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{JukeboxQueueEntity, JukeboxSettingsEntity};
use crate::metrics::QueryTimer;

/// Repository for per-event jukebox settings.
#[derive(Clone)]
pub struct JukeboxSettingsRepository {
    pool: PgPool,
}

impl JukeboxSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_event_id(
        &self,
        event_id: Uuid,
    ) -> Result<Option<JukeboxSettingsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_jukebox_settings");
        let result = sqlx::query_as::<_, JukeboxSettingsEntity>(
            r#"
            SELECT * FROM jukebox_settings WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upsert settings for an event. None values preserve the current
    /// (or default) value.
    pub async fn upsert(
        &self,
        event_id: Uuid,
        enabled: Option<bool>,
        provider: Option<&str>,
    ) -> Result<JukeboxSettingsEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_jukebox_settings");
        let result = sqlx::query_as::<_, JukeboxSettingsEntity>(
            r#"
            INSERT INTO jukebox_settings (event_id, enabled, provider)
            VALUES ($1, COALESCE($2, true), COALESCE($3, 'spotify'))
            ON CONFLICT (event_id) DO UPDATE SET
                enabled = COALESCE($2, jukebox_settings.enabled),
                provider = COALESCE($3, jukebox_settings.provider),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(enabled)
        .bind(provider)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Repository for jukebox queue database operations.
#[derive(Clone)]
pub struct JukeboxQueueRepository {
    pool: PgPool,
}

impl JukeboxQueueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a track to an event's queue. Votes start at one, counting the
    /// adder.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_track(
        &self,
        event_id: Uuid,
        track_id: &str,
        title: &str,
        artist: &str,
        album: Option<&str>,
        artwork_url: Option<&str>,
        duration_ms: Option<i64>,
        genre: &str,
        provider: &str,
        added_by: &str,
    ) -> Result<JukeboxQueueEntity, sqlx::Error> {
        let timer = QueryTimer::new("add_jukebox_track");
        let result = sqlx::query_as::<_, JukeboxQueueEntity>(
            r#"
            INSERT INTO jukebox_queue (event_id, track_id, title, artist, album, artwork_url,
                                       duration_ms, genre, provider, votes, status, added_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1, 'pending', $10)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(track_id)
        .bind(title)
        .bind(artist)
        .bind(album)
        .bind(artwork_url)
        .bind(duration_ms)
        .bind(genre)
        .bind(provider)
        .bind(added_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Pending queue for an event in playback order: votes descending,
    /// then earliest added.
    pub async fn find_pending(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<JukeboxQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pending_jukebox_queue");
        let result = sqlx::query_as::<_, JukeboxQueueEntity>(
            r#"
            SELECT * FROM jukebox_queue
            WHERE event_id = $1 AND status = 'pending'
            ORDER BY votes DESC, created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a queue item by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<JukeboxQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_jukebox_item_by_id");
        let result = sqlx::query_as::<_, JukeboxQueueEntity>(
            r#"
            SELECT * FROM jukebox_queue WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Increment a pending item's vote count.
    pub async fn upvote(&self, id: Uuid) -> Result<Option<JukeboxQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("upvote_jukebox_item");
        let result = sqlx::query_as::<_, JukeboxQueueEntity>(
            r#"
            UPDATE jukebox_queue SET votes = votes + 1
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark an item as played so it drops out of the pending queue.
    pub async fn mark_played(&self, id: Uuid) -> Result<Option<JukeboxQueueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("mark_jukebox_item_played");
        let result = sqlx::query_as::<_, JukeboxQueueEntity>(
            r#"
            UPDATE jukebox_queue SET status = 'played'
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove an item from the queue.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_jukebox_item");
        let result = sqlx::query(
            r#"
            DELETE FROM jukebox_queue WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map(|done| done.rows_affected() > 0);
        timer.record();
        result
    }
}
