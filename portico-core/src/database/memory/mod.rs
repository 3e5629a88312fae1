//! In-process adapters backing tests and `serve --in-memory`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use portico_model::{QueryEnvelope, StatisticsRecord, StatsKey};

use crate::database::document;
use crate::database::ports::{ContentRepository, StatisticsStore};
use crate::error::{ContentError, Result};
use crate::query::{ShapedQuery, evaluate};

#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    next_id: AtomicI64,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn not_found(collection: &str, document_id: &str) -> ContentError {
        ContentError::NotFound {
            collection: collection.to_string(),
            document_id: document_id.to_string(),
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn find(&self, query: &ShapedQuery) -> Result<QueryEnvelope> {
        let documents = self
            .collections
            .read()
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();
        debug!(
            collection = %query.collection,
            candidates = documents.len(),
            "evaluating in-memory query"
        );
        Ok(evaluate(documents, query))
    }

    async fn create(&self, collection: &str, document: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = document::new_entry(document, id, Utc::now())?;
        let document_id = document::document_id(&entry).unwrap_or_default();

        let mut collections = self.collections.write();
        let entries = collections.entry(collection.to_string()).or_default();
        if entries
            .iter()
            .any(|existing| document::document_id(existing) == Some(document_id))
        {
            return Err(ContentError::DuplicateEntry {
                collection: collection.to_string(),
                document_id: document_id.to_string(),
            });
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        collection: &str,
        document_id: &str,
        changes: Value,
    ) -> Result<Value> {
        let mut collections = self.collections.write();
        let entry = collections
            .get_mut(collection)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|entry| document::document_id(entry) == Some(document_id))
            })
            .ok_or_else(|| Self::not_found(collection, document_id))?;

        *entry = document::merge_changes(entry.take(), changes, Utc::now())?;
        Ok(entry.clone())
    }

    async fn delete(&self, collection: &str, document_id: &str) -> Result<Value> {
        let mut collections = self.collections.write();
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection, document_id))?;
        let position = entries
            .iter()
            .position(|entry| document::document_id(entry) == Some(document_id))
            .ok_or_else(|| Self::not_found(collection, document_id))?;
        Ok(entries.remove(position))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStatisticsStore {
    records: RwLock<Vec<StatisticsRecord>>,
    next_id: AtomicI64,
}

impl InMemoryStatisticsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatisticsStore for InMemoryStatisticsStore {
    async fn find_one(&self, key: StatsKey) -> Result<Option<StatisticsRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| record.key == key.as_str())
            .cloned())
    }

    async fn create(&self, key: StatsKey, data: Value) -> Result<StatisticsRecord> {
        let mut records = self.records.write();
        if records.iter().any(|record| record.key == key.as_str()) {
            return Err(ContentError::DuplicateStatistics(key.to_string()));
        }
        let record = StatisticsRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            key: key.to_string(),
            data,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, data: Value) -> Result<StatisticsRecord> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(ContentError::StatisticsNotFound(id))?;
        record.data = data;
        Ok(record.clone())
    }
}
