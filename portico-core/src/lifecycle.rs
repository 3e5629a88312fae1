//! Write path for content entries and the hooks fired after each write.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

use crate::database::ports::{ContentRepository, StatisticsStore};
use crate::error::{ContentError, Result};
use crate::stats::StatsAggregator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEventKind {
    AfterCreate,
    AfterUpdate,
    AfterDelete,
}

impl LifecycleEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEventKind::AfterCreate => "afterCreate",
            LifecycleEventKind::AfterUpdate => "afterUpdate",
            LifecycleEventKind::AfterDelete => "afterDelete",
        }
    }
}

impl Display for LifecycleEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    pub kind: LifecycleEventKind,
    pub collection: String,
    /// The entry as stored after the write (as it was, for deletes).
    pub entry: Value,
}

#[async_trait]
pub trait LifecycleHook: Send + Sync {
    async fn handle(&self, event: &LifecycleEvent) -> Result<()>;
}

/// Content writes followed by the hooks registered for the collection.
///
/// Hooks run in registration order and are awaited. The first failing hook
/// fails the call; the write itself is not rolled back.
#[derive(Clone)]
pub struct ContentService {
    repository: Arc<dyn ContentRepository>,
    hooks: HashMap<String, Vec<Arc<dyn LifecycleHook>>>,
}

impl fmt::Debug for ContentService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let hooks: HashMap<&str, usize> = self
            .hooks
            .iter()
            .map(|(collection, hooks)| (collection.as_str(), hooks.len()))
            .collect();
        f.debug_struct("ContentService").field("hooks", &hooks).finish()
    }
}

impl ContentService {
    pub fn new(repository: Arc<dyn ContentRepository>) -> Self {
        Self {
            repository,
            hooks: HashMap::new(),
        }
    }

    /// Service with the grant and publication aggregators registered.
    pub fn with_statistics(
        repository: Arc<dyn ContentRepository>,
        store: Arc<dyn StatisticsStore>,
    ) -> Self {
        let grants = StatsAggregator::grants(repository.clone(), store.clone());
        let publications = StatsAggregator::publications(repository.clone(), store);
        Self::new(repository).with_aggregator(grants).with_aggregator(publications)
    }

    pub fn with_aggregator(self, aggregator: StatsAggregator) -> Self {
        let collection = aggregator.collection();
        self.with_hook(collection, Arc::new(aggregator))
    }

    pub fn with_hook(mut self, collection: &str, hook: Arc<dyn LifecycleHook>) -> Self {
        self.register(collection, hook);
        self
    }

    pub fn register(&mut self, collection: &str, hook: Arc<dyn LifecycleHook>) {
        self.hooks.entry(collection.to_string()).or_default().push(hook);
    }

    pub async fn create(&self, collection: &str, document: Value) -> Result<Value> {
        let entry = self.repository.create(collection, document).await?;
        self.dispatch(LifecycleEventKind::AfterCreate, collection, &entry)
            .await?;
        Ok(entry)
    }

    pub async fn update(
        &self,
        collection: &str,
        document_id: &str,
        changes: Value,
    ) -> Result<Value> {
        let entry = self
            .repository
            .update(collection, document_id, changes)
            .await?;
        self.dispatch(LifecycleEventKind::AfterUpdate, collection, &entry)
            .await?;
        Ok(entry)
    }

    pub async fn delete(&self, collection: &str, document_id: &str) -> Result<Value> {
        let entry = self.repository.delete(collection, document_id).await?;
        self.dispatch(LifecycleEventKind::AfterDelete, collection, &entry)
            .await?;
        Ok(entry)
    }

    async fn dispatch(
        &self,
        kind: LifecycleEventKind,
        collection: &str,
        entry: &Value,
    ) -> Result<()> {
        let Some(hooks) = self.hooks.get(collection) else {
            return Ok(());
        };
        let event = LifecycleEvent {
            kind,
            collection: collection.to_string(),
            entry: entry.clone(),
        };
        debug!(%kind, collection, hooks = hooks.len(), "dispatching lifecycle event");

        for hook in hooks {
            if let Err(source) = hook.handle(&event).await {
                error!(%kind, collection, error = %source, "lifecycle hook failed");
                return Err(ContentError::Hook {
                    collection: collection.to_string(),
                    source: Box::new(source),
                });
            }
        }
        Ok(())
    }
}
