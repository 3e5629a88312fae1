use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tracing::debug;

use portico_model::QueryEnvelope;

use crate::database::document;
use crate::database::ports::ContentRepository;
use crate::error::{ContentError, Result};
use crate::query::{ShapedQuery, evaluate};

const DOCUMENT_UNIQUE_CONSTRAINT: &str = "content_entries_document_unique";

/// Documents live whole in `content_entries.document`; queries are evaluated
/// over the collection's rows.
#[derive(Debug, Clone)]
pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn not_found(collection: &str, document_id: &str) -> ContentError {
        ContentError::NotFound {
            collection: collection.to_string(),
            document_id: document_id.to_string(),
        }
    }
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn find(&self, query: &ShapedQuery) -> Result<QueryEnvelope> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM content_entries
            WHERE collection = $1
            ORDER BY id
            "#,
        )
        .bind(&query.collection)
        .fetch_all(self.pool())
        .await?;

        let documents = rows
            .into_iter()
            .map(|row| row.try_get::<Value, _>("document"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(
            collection = %query.collection,
            candidates = documents.len(),
            "evaluating stored query"
        );
        Ok(evaluate(documents, query))
    }

    async fn create(&self, collection: &str, document: Value) -> Result<Value> {
        let mut tx = self.pool().begin().await?;

        let id: i64 = sqlx::query_scalar("SELECT nextval('content_entries_id_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let now = Utc::now();
        let entry = document::new_entry(document, id, now)?;
        let document_id = document::document_id(&entry)
            .ok_or_else(|| ContentError::Internal("entry without documentId".into()))?
            .to_string();

        sqlx::query(
            r#"
            INSERT INTO content_entries
                (id, collection, document_id, document, published_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(id)
        .bind(collection)
        .bind(&document_id)
        .bind(&entry)
        .bind(document::published_at(&entry))
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db) = &err
                && db.constraint() == Some(DOCUMENT_UNIQUE_CONSTRAINT)
            {
                return ContentError::DuplicateEntry {
                    collection: collection.to_string(),
                    document_id: document_id.clone(),
                };
            }
            ContentError::from(err)
        })?;

        tx.commit().await?;
        Ok(entry)
    }

    async fn update(
        &self,
        collection: &str,
        document_id: &str,
        changes: Value,
    ) -> Result<Value> {
        let mut tx = self.pool().begin().await?;

        let existing: Value = sqlx::query_scalar(
            r#"
            SELECT document
            FROM content_entries
            WHERE collection = $1 AND document_id = $2
            FOR UPDATE
            "#,
        )
        .bind(collection)
        .bind(document_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Self::not_found(collection, document_id))?;

        let now = Utc::now();
        let merged = document::merge_changes(existing, changes, now)?;

        sqlx::query(
            r#"
            UPDATE content_entries
            SET document = $3, published_at = $4, updated_at = $5
            WHERE collection = $1 AND document_id = $2
            "#,
        )
        .bind(collection)
        .bind(document_id)
        .bind(&merged)
        .bind(document::published_at(&merged))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(merged)
    }

    async fn delete(&self, collection: &str, document_id: &str) -> Result<Value> {
        sqlx::query_scalar::<_, Value>(
            r#"
            DELETE FROM content_entries
            WHERE collection = $1 AND document_id = $2
            RETURNING document
            "#,
        )
        .bind(collection)
        .bind(document_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Self::not_found(collection, document_id))
    }
}
