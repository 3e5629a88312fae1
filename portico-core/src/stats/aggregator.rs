use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use portico_model::{StatisticsRecord, StatsKey};

use super::{Clock, GrantStatsCalculator, PublicationStatsCalculator, StatsCalculator, SystemClock};
use crate::database::ports::{ContentRepository, StatisticsStore};
use crate::error::{ContentError, Result};
use crate::lifecycle::{LifecycleEvent, LifecycleHook};

/// Recomputes one aggregate from its whole collection and overwrites the
/// stored record.
///
/// Runs are not serialized against each other: concurrent writes each
/// recompute, and the last store write wins.
#[derive(Clone)]
pub struct StatsAggregator {
    content: Arc<dyn ContentRepository>,
    store: Arc<dyn StatisticsStore>,
    calculator: Arc<dyn StatsCalculator>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("key", &self.calculator.key())
            .field("collection", &self.calculator.collection())
            .field("clock", &self.clock)
            .finish()
    }
}

impl StatsAggregator {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        store: Arc<dyn StatisticsStore>,
        calculator: Arc<dyn StatsCalculator>,
    ) -> Self {
        Self {
            content,
            store,
            calculator,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn grants(content: Arc<dyn ContentRepository>, store: Arc<dyn StatisticsStore>) -> Self {
        Self::new(content, store, Arc::new(GrantStatsCalculator))
    }

    pub fn publications(
        content: Arc<dyn ContentRepository>,
        store: Arc<dyn StatisticsStore>,
    ) -> Self {
        Self::new(content, store, Arc::new(PublicationStatsCalculator))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> StatsKey {
        self.calculator.key()
    }

    pub fn collection(&self) -> &'static str {
        self.calculator.collection()
    }

    pub async fn recalculate(&self) -> Result<StatisticsRecord> {
        let key = self.calculator.key();
        info!(%key, "recalculating statistics");

        let entries = self.content.find(&self.calculator.source_query()).await?.data;
        let data = self.calculator.compute(&entries, self.clock.now())?;

        let record = match self.store.find_one(key).await? {
            Some(existing) => self.store.update(existing.id, data).await?,
            None => match self.store.create(key, data.clone()).await {
                Ok(record) => record,
                // A concurrent run created the record first.
                Err(ContentError::DuplicateStatistics(_)) => {
                    debug!(%key, "statistics created concurrently, overwriting");
                    let existing = self
                        .store
                        .find_one(key)
                        .await?
                        .ok_or_else(|| ContentError::Internal(format!("{key} vanished")))?;
                    self.store.update(existing.id, data).await?
                }
                Err(err) => return Err(err),
            },
        };

        info!(%key, id = record.id, entries = entries.len(), "statistics updated");
        Ok(record)
    }
}

#[async_trait]
impl LifecycleHook for StatsAggregator {
    async fn handle(&self, event: &LifecycleEvent) -> Result<()> {
        debug!(
            key = %self.calculator.key(),
            event = %event.kind,
            collection = %event.collection,
            "content changed, refreshing statistics"
        );
        self.recalculate().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use serde_json::Value;

    use super::*;
    use crate::database::{InMemoryContentRepository, InMemoryStatisticsStore};
    use crate::stats::FixedClock;

    /// Lets another task run between the existence check and the insert.
    #[derive(Default)]
    struct InterleavingStore {
        inner: InMemoryStatisticsStore,
    }

    #[async_trait]
    impl StatisticsStore for InterleavingStore {
        async fn find_one(&self, key: StatsKey) -> Result<Option<StatisticsRecord>> {
            let found = self.inner.find_one(key).await;
            tokio::task::yield_now().await;
            found
        }

        async fn create(&self, key: StatsKey, data: Value) -> Result<StatisticsRecord> {
            self.inner.create(key, data).await
        }

        async fn update(&self, id: i64, data: Value) -> Result<StatisticsRecord> {
            self.inner.update(id, data).await
        }
    }

    fn aggregator(
        content: Arc<InMemoryContentRepository>,
        store: Arc<dyn StatisticsStore>,
    ) -> StatsAggregator {
        StatsAggregator::grants(content, store).with_clock(Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap(),
        )))
    }

    #[tokio::test]
    async fn first_run_creates_then_later_runs_overwrite() {
        let content = Arc::new(InMemoryContentRepository::new());
        let store = Arc::new(InMemoryStatisticsStore::new());
        let aggregator = aggregator(content.clone(), store.clone());

        content
            .create("grants-n-projects", json!({ "total_funding": 10, "on_time": true }))
            .await
            .unwrap();
        let first = aggregator.recalculate().await.unwrap();
        assert_eq!(first.key, "grant-stats");
        assert_eq!(first.data["totalFunding"], 10.0);

        content
            .create("grants-n-projects", json!({ "total_funding": 5, "on_time": false }))
            .await
            .unwrap();
        let second = aggregator.recalculate().await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.data["totalGrants"], 2);
        assert_eq!(second.data["deliveryRate"], 0.5);
    }

    #[tokio::test]
    async fn rerunning_without_writes_is_idempotent() {
        let content = Arc::new(InMemoryContentRepository::new());
        let store = Arc::new(InMemoryStatisticsStore::new());
        let aggregator = aggregator(content.clone(), store.clone());
        content
            .create(
                "grants-n-projects",
                json!({ "total_funding": 7, "type_of_grants": "national grants" }),
            )
            .await
            .unwrap();

        let first = aggregator.recalculate().await.unwrap();
        let second = aggregator.recalculate().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn concurrent_first_runs_both_succeed() {
        let content = Arc::new(InMemoryContentRepository::new());
        let store: Arc<dyn StatisticsStore> = Arc::new(InterleavingStore::default());
        content
            .create("grants-n-projects", json!({ "total_funding": 3, "on_time": true }))
            .await
            .unwrap();
        let first = aggregator(content.clone(), store.clone());
        let second = aggregator(content.clone(), store.clone());

        let (a, b) = tokio::join!(first.recalculate(), second.recalculate());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);

        let stored = store.find_one(StatsKey::Grants).await.unwrap().unwrap();
        assert_eq!(stored.data["totalGrants"], 1);
    }
}
