use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{HeaderValue, Method},
};
use portico_core::database::postgres::{self, PostgresContentRepository, PostgresStatisticsStore};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    infra::{
        app_state::AppState,
        config::{Config, CorsConfig},
    },
    routes,
};

/// Wire stores for `config`: process-local when `in_memory`, PostgreSQL
/// (with migrations applied) otherwise.
pub async fn build_state(config: Arc<Config>, in_memory: bool) -> Result<AppState> {
    if in_memory {
        warn!("using in-memory stores; content is lost on shutdown");
        return Ok(AppState::in_memory(config));
    }

    let pool = connect_database(&config).await?;
    postgres::migrate(&pool)
        .await
        .context("database migration failed")?;

    Ok(AppState::new(
        Arc::clone(&config),
        Arc::new(PostgresContentRepository::new(pool.clone())),
        Arc::new(PostgresStatisticsStore::new(pool)),
    ))
}

pub async fn connect_database(config: &Config) -> Result<sqlx::PgPool> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL (or [database].url) must be set unless --in-memory is used")?;
    let pool = postgres::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!("connected to PostgreSQL");
    Ok(pool)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors);
    routes::create_api_router(&state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(AllowHeaders::any())
}

pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
