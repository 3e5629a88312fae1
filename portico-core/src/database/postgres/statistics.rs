use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use portico_model::{StatisticsRecord, StatsKey};

use crate::database::ports::StatisticsStore;
use crate::error::{ContentError, Result};

#[derive(Debug, Clone)]
pub struct PostgresStatisticsStore {
    pool: PgPool,
}

impl PostgresStatisticsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<StatisticsRecord> {
        Ok(StatisticsRecord {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            data: row.try_get("data")?,
        })
    }
}

#[async_trait]
impl StatisticsStore for PostgresStatisticsStore {
    async fn find_one(&self, key: StatsKey) -> Result<Option<StatisticsRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, key, data
            FROM statistics
            WHERE key = $1
            LIMIT 1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn create(&self, key: StatsKey, data: Value) -> Result<StatisticsRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO statistics (key, data)
            VALUES ($1, $2)
            ON CONFLICT (key) DO NOTHING
            RETURNING id, key, data
            "#,
        )
        .bind(key.as_str())
        .bind(&data)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ContentError::DuplicateStatistics(key.to_string()))?;

        Self::map_row(&row)
    }

    async fn update(&self, id: i64, data: Value) -> Result<StatisticsRecord> {
        let row = sqlx::query(
            r#"
            UPDATE statistics
            SET data = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, key, data
            "#,
        )
        .bind(id)
        .bind(&data)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ContentError::StatisticsNotFound(id))?;

        Self::map_row(&row)
    }
}
