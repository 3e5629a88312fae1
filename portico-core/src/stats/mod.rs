//! Aggregate statistics recomputed from whole collections.

mod aggregator;
mod clock;
mod grants;
mod publications;

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

use portico_model::StatsKey;

use crate::error::Result;
use crate::query::ShapedQuery;

pub use aggregator::StatsAggregator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use grants::GrantStatsCalculator;
pub use publications::PublicationStatsCalculator;

/// One aggregate: which entries it reads and how it folds them.
pub trait StatsCalculator: Send + Sync {
    fn key(&self) -> StatsKey;

    /// Collection whose writes invalidate this aggregate.
    fn collection(&self) -> &'static str;

    /// Unpaginated query selecting only what [`compute`](Self::compute) reads.
    fn source_query(&self) -> ShapedQuery;

    fn compute(&self, entries: &[Value], now: DateTime<Utc>) -> Result<Value>;
}

/// Numbers may arrive as JSON numbers or numeric strings (decimal columns).
pub(crate) fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(raw)) => raw.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Entries whose `updatedAt` falls in the same UTC calendar month as `now`.
pub(crate) fn updated_this_month(entries: &[Value], now: DateTime<Utc>) -> u64 {
    entries
        .iter()
        .filter_map(|entry| entry.get("updatedAt").and_then(Value::as_str))
        .filter_map(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|stamp| stamp.with_timezone(&Utc))
        .filter(|stamp| stamp.year() == now.year() && stamp.month() == now.month())
        .count() as u64
}
