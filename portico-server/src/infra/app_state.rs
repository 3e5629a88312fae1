use std::{fmt, sync::Arc};

use portico_core::{
    collections::CollectionRegistry,
    database::{
        ContentRepository, InMemoryContentRepository, InMemoryStatisticsStore, StatisticsStore,
    },
    lifecycle::ContentService,
    stats::StatsAggregator,
};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<dyn ContentRepository>,
    pub statistics: Arc<dyn StatisticsStore>,
    /// Write path with the statistics aggregators registered.
    pub content_service: Arc<ContentService>,
    pub collections: Arc<CollectionRegistry>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        content: Arc<dyn ContentRepository>,
        statistics: Arc<dyn StatisticsStore>,
    ) -> Self {
        let content_service = Arc::new(ContentService::with_statistics(
            Arc::clone(&content),
            Arc::clone(&statistics),
        ));
        Self {
            content,
            statistics,
            content_service,
            collections: Arc::new(CollectionRegistry::builtin()),
            config,
        }
    }

    /// State backed by process-local stores.
    pub fn in_memory(config: Arc<Config>) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryContentRepository::new()),
            Arc::new(InMemoryStatisticsStore::new()),
        )
    }

    /// Aggregators over this state's stores, for on-demand recalculation.
    pub fn aggregators(&self) -> [StatsAggregator; 2] {
        [
            StatsAggregator::grants(Arc::clone(&self.content), Arc::clone(&self.statistics)),
            StatsAggregator::publications(
                Arc::clone(&self.content),
                Arc::clone(&self.statistics),
            ),
        ]
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
