//! Core data model definitions shared across Portico crates.
#![allow(missing_docs)]

pub mod envelope;
pub mod error;
pub mod media;
pub mod mode;
pub mod stats;

// Intentionally curated re-exports for downstream consumers.
pub use envelope::{PaginationMeta, QueryEnvelope, ResponseMeta};
pub use error::ModelError;
pub use media::{MediaAsset, Rendition, RenditionCatalog, SizePreference};
pub use mode::QueryMode;
pub use stats::{
    ClassificationCounts, GrantStats, PublicationStats, StatisticsRecord,
    StatsKey,
};
