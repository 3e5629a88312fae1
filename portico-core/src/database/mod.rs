//! Content and statistics persistence.
//!
//! Both adapters load a collection's documents and run them through
//! [`crate::query::evaluate`], so filtering, sorting, paging, and projection
//! behave identically in memory and against PostgreSQL.

pub mod document;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod ports;

pub use memory::{InMemoryContentRepository, InMemoryStatisticsStore};
pub use ports::{ContentRepository, StatisticsStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresContentRepository, PostgresStatisticsStore};
