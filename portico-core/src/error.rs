use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Entry not found: {collection}/{document_id}")]
    NotFound {
        collection: String,
        document_id: String,
    },

    #[error("Entry already exists: {collection}/{document_id}")]
    DuplicateEntry {
        collection: String,
        document_id: String,
    },

    #[error("Statistics record not found: {0}")]
    StatisticsNotFound(i64),

    #[error("Statistics record already exists: {0}")]
    DuplicateStatistics(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Lifecycle hook failed for {collection}: {source}")]
    Hook {
        collection: String,
        #[source]
        source: Box<ContentError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;
