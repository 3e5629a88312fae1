//! # Portico Core
//!
//! Core library for the Portico content backend: the pieces that sit between
//! an HTTP route and the content store.
//!
//! ## Overview
//!
//! - **Collections**: declarative [`collections::CollectionSpec`]s describing,
//!   per query mode, which fields, relations, sort, and page sizes a
//!   collection serves, plus its search parameters and media sizing rules
//! - **Shaping**: the request shaper turning `?mode=...` into a
//!   [`query::ShapedQuery`] and the response shaper reshaping the executor's
//!   envelope
//! - **Media**: rendition selection for populated image fields
//! - **Statistics**: aggregators recomputing `grant-stats` and
//!   `publication-stats` on every write
//! - **Database**: repository/store ports with in-memory and PostgreSQL
//!   adapters sharing one query evaluation engine
//!
//! ## Feature Flags
//!
//! - `postgres` (default): SQLx-backed adapters and embedded migrations

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod collections;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod media;
pub mod query;
pub mod shaping;
pub mod stats;

pub use error::{ContentError, Result};

/// Embedded schema migrations for the PostgreSQL adapters.
#[cfg(feature = "postgres")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
