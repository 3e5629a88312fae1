//! Repository ports the shapers, aggregators, and handlers depend on.
//! Adapters live under `database::memory` and `database::postgres`.

pub mod content;
pub mod statistics;

pub use content::ContentRepository;
pub use statistics::StatisticsStore;
