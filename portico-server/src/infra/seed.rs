//! Bulk import of content entries through the lifecycle-aware write path.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use portico_core::ContentError;

use crate::infra::app_state::AppState;

/// Collection name to the entries to create in it.
pub type SeedFile = BTreeMap<String, Vec<Value>>;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown collection '{0}' in seed data")]
    UnknownCollection(String),
    #[error("failed to seed {collection}")]
    Content {
        collection: String,
        #[source]
        source: ContentError,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub created: BTreeMap<String, usize>,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.created.values().sum()
    }
}

pub fn read_seed_file(path: &Path) -> Result<SeedFile, SeedError> {
    let contents = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Create every entry, firing lifecycle hooks as regular writes do. Nothing
/// is written when a collection is unknown.
pub async fn seed(state: &AppState, entries: SeedFile) -> Result<SeedReport, SeedError> {
    if let Some(unknown) = entries
        .keys()
        .find(|name| state.collections.get(name).is_none())
    {
        return Err(SeedError::UnknownCollection(unknown.clone()));
    }

    let mut report = SeedReport::default();
    for (collection, documents) in entries {
        let count = documents.len();
        for document in documents {
            state
                .content_service
                .create(&collection, document)
                .await
                .map_err(|source| SeedError::Content {
                    collection: collection.clone(),
                    source,
                })?;
        }
        info!(%collection, count, "seeded collection");
        report.created.insert(collection, count);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::infra::config::Config;

    #[tokio::test]
    async fn unknown_collections_abort_before_writing() {
        let state = AppState::in_memory(Arc::new(Config::default()));
        let entries: SeedFile = serde_json::from_value(json!({
            "news": [{ "title": "kept out" }],
            "podcasts": [{ "title": "nope" }]
        }))
        .unwrap();

        let err = seed(&state, entries).await.unwrap_err();
        assert!(matches!(err, SeedError::UnknownCollection(name) if name == "podcasts"));
    }

    #[tokio::test]
    async fn seeding_reports_counts_per_collection() {
        let state = AppState::in_memory(Arc::new(Config::default()));
        let entries: SeedFile = serde_json::from_value(json!({
            "news": [{ "title": "a" }, { "title": "b" }],
            "publics": [{ "title": "p", "publishedAt": "2024-01-01T00:00:00.000Z" }]
        }))
        .unwrap();

        let report = seed(&state, entries).await.unwrap();
        assert_eq!(report.total(), 3);
        assert_eq!(report.created.get("news"), Some(&2));
    }

    #[test]
    fn seed_files_are_json_objects_of_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, r#"{ "news": [{ "title": "a" }] }"#).unwrap();
        assert_eq!(read_seed_file(&path).unwrap()["news"].len(), 1);

        fs::write(&path, "[]").unwrap();
        assert!(matches!(read_seed_file(&path), Err(SeedError::Parse { .. })));
    }
}
