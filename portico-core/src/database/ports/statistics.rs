use async_trait::async_trait;
use serde_json::Value;

use portico_model::{StatisticsRecord, StatsKey};

use crate::error::Result;

/// Keyed aggregate records, replaced wholesale on every write.
#[async_trait]
pub trait StatisticsStore: Send + Sync {
    async fn find_one(&self, key: StatsKey) -> Result<Option<StatisticsRecord>>;

    async fn create(&self, key: StatsKey, data: Value) -> Result<StatisticsRecord>;

    async fn update(&self, id: i64, data: Value) -> Result<StatisticsRecord>;
}
