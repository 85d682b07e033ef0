//! Admin configuration repository.

use sqlx::PgPool;

use crate::entities::AdminConfigEntity;
use crate::metrics::QueryTimer;

/// Repository for operator-tunable key/value settings.
#[derive(Clone)]
pub struct AdminConfigRepository {
    pool: PgPool,
}

impl AdminConfigRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_key(&self, key: &str) -> Result<Option<AdminConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_admin_config");
        let result = sqlx::query_as::<_, AdminConfigEntity>(
            r#"
            SELECT * FROM admin_config WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list(&self) -> Result<Vec<AdminConfigEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_admin_config");
        let result = sqlx::query_as::<_, AdminConfigEntity>(
            r#"
            SELECT * FROM admin_config ORDER BY key ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        updated_by: &str,
    ) -> Result<AdminConfigEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_admin_config");
        let result = sqlx::query_as::<_, AdminConfigEntity>(
            r#"
            INSERT INTO admin_config (key, value, updated_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET
                value = $2,
                updated_by = $3,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete(&self, key: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_admin_config");
        let result = sqlx::query(
            r#"
            DELETE FROM admin_config WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await
        .map(|done| done.rows_affected() > 0);
        timer.record();
        result
    }
}
