//! PostgreSQL adapters.

mod content;
mod statistics;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{ContentError, Result};

pub use content::PostgresContentRepository;
pub use statistics::PostgresStatisticsStore;

/// Open a pool against `url`.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(url)
        .await?;

    info!(max_connections, "database pool initialized");
    Ok(pool)
}

/// Apply the embedded migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    crate::MIGRATOR
        .run(pool)
        .await
        .map_err(|e| ContentError::Internal(format!("Migration failed: {e}")))?;
    info!("database migrations applied");
    Ok(())
}
