use axum::{Extension, Json, extract::State};

use portico_core::query::ShapedQuery;
use portico_model::QueryEnvelope;

use crate::infra::{app_state::AppState, errors::AppResult};

/// Run the query the shaping layer built for this request.
pub async fn find_entries(
    State(state): State<AppState>,
    Extension(query): Extension<ShapedQuery>,
) -> AppResult<Json<QueryEnvelope>> {
    let envelope = state.content.find(&query).await?;
    Ok(Json(envelope))
}
