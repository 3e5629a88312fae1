use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{
    AppState,
    handlers::{content::find_entries, health::health, statistics::get_statistics},
    infra::middleware::ContentShapingLayer,
};

pub const HEALTH: &str = "/api/health";
pub const STATISTICS: &str = "/api/statistics";

/// One shaped route per registered collection, plus statistics and health.
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    let max_page_size = state.config().content.max_page_size;

    state.collections.iter().fold(
        Router::new()
            .route(HEALTH, get(health))
            .route(STATISTICS, get(get_statistics)),
        |router, spec| {
            router.route(
                &spec.route,
                get(find_entries).layer(ContentShapingLayer::new(Arc::clone(spec), max_page_size)),
            )
        },
    )
}
