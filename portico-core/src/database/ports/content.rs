use async_trait::async_trait;
use serde_json::Value;

use portico_model::QueryEnvelope;

use crate::error::Result;
use crate::query::ShapedQuery;

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Run a shaped query against one collection.
    async fn find(&self, query: &ShapedQuery) -> Result<QueryEnvelope>;

    /// Store a new entry, assigning `id`, `documentId`, and timestamps.
    async fn create(&self, collection: &str, document: Value) -> Result<Value>;

    /// Shallow-merge `changes` into an existing entry.
    async fn update(
        &self,
        collection: &str,
        document_id: &str,
        changes: Value,
    ) -> Result<Value>;

    async fn delete(&self, collection: &str, document_id: &str) -> Result<Value>;
}
