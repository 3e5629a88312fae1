use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use portico_model::StatsKey;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsParams {
    pub mode: Option<String>,
}

/// Stored aggregate for `?mode=grants` or `?mode=publication`, verbatim.
pub async fn get_statistics(
    State(state): State<AppState>,
    Query(params): Query<StatisticsParams>,
) -> AppResult<Json<Value>> {
    let key = params
        .mode
        .as_deref()
        .and_then(|mode| StatsKey::from_mode(mode).ok())
        .ok_or_else(|| {
            AppError::bad_request("Invalid query. Use ?mode=grants or ?mode=publication")
        })?;

    let record = state.statistics.find_one(key).await.map_err(|err| {
        error!(%key, error = %err, "failed to read statistics");
        AppError::internal("Internal Server Error")
    })?;

    match record {
        Some(record) => Ok(Json(record.data)),
        None => Err(AppError::not_found(format!("No data found for {key}"))),
    }
}
