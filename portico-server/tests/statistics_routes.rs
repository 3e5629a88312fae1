mod support;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{Value, json};

use support::{
    UnavailableStatisticsStore, build_test_app, build_test_app_with_statistics, seed_fixtures,
};

#[tokio::test]
async fn grant_statistics_follow_seeded_content() -> Result<()> {
    let app = build_test_app()?;
    seed_fixtures(&app.state).await?;

    let response = app
        .server
        .get("/api/statistics")
        .add_query_param("mode", "grants")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["totalGrants"], 2);
    assert_eq!(body["totalFunding"], 200000.0);
    assert_eq!(body["totalNationalGrants"], 1);
    assert_eq!(body["totalIndustryGrants"], 1);
    assert_eq!(body["totalInternalGrants"], 0);
    assert_eq!(body["deliveryRate"], 0.5);
    assert_eq!(body["totalPaper"], 1);
    assert_eq!(body["totalPatent"], 0);
    assert_eq!(body["totalMaster"], 2);
    assert_eq!(body["totalPhd"], 1);
    Ok(())
}

#[tokio::test]
async fn publication_statistics_count_classifications() -> Result<()> {
    let app = build_test_app()?;
    seed_fixtures(&app.state).await?;

    let response = app
        .server
        .get("/api/statistics")
        .add_query_param("mode", "publication")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["totalPapers"], 3);
    assert_eq!(body["classificationCounts"]["WWoS Q1"], 1);
    assert_eq!(body["classificationCounts"]["WWoS Q2"], 1);
    assert_eq!(body["classificationCounts"]["Conference Paper"], 1);
    assert_eq!(body["classificationCounts"]["Patent Granted"], 0);
    Ok(())
}

#[tokio::test]
async fn statistics_track_later_writes() -> Result<()> {
    let app = build_test_app()?;
    seed_fixtures(&app.state).await?;

    app.state
        .content_service
        .update("grants-n-projects", "grant-2", json!({ "on_time": true }))
        .await?;

    let body = app
        .server
        .get("/api/statistics")
        .add_query_param("mode", "grants")
        .await
        .json::<Value>();
    assert_eq!(body["deliveryRate"], 1.0);

    app.state
        .content_service
        .delete("grants-n-projects", "grant-1")
        .await?;
    let body = app
        .server
        .get("/api/statistics")
        .add_query_param("mode", "grants")
        .await
        .json::<Value>();
    assert_eq!(body["totalGrants"], 1);
    assert_eq!(body["totalFunding"], 80000.0);
    Ok(())
}

#[tokio::test]
async fn unknown_or_missing_mode_is_a_bad_request() -> Result<()> {
    let app = build_test_app()?;

    for query in [Some("grant"), Some(""), None] {
        let mut request = app.server.get("/api/statistics");
        if let Some(mode) = query {
            request = request.add_query_param("mode", mode);
        }
        let response = request.await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"]["message"],
            "Invalid query. Use ?mode=grants or ?mode=publication"
        );
    }
    Ok(())
}

#[tokio::test]
async fn missing_record_is_not_found() -> Result<()> {
    let app = build_test_app()?;

    let response = app
        .server
        .get("/api/statistics")
        .add_query_param("mode", "publication")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "No data found for publication-stats"
    );
    Ok(())
}

#[tokio::test]
async fn store_failures_are_internal_errors() -> Result<()> {
    let app = build_test_app_with_statistics(Arc::new(UnavailableStatisticsStore))?;

    let response = app
        .server
        .get("/api/statistics")
        .add_query_param("mode", "grants")
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Internal Server Error"
    );
    Ok(())
}
