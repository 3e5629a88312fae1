use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};

use portico_core::{
    ContentError,
    database::{
        ContentRepository, InMemoryContentRepository, InMemoryStatisticsStore, StatisticsStore,
    },
    query::ShapedQuery,
};
use portico_model::{QueryEnvelope, StatisticsRecord, StatsKey};
use portico_server::{
    AppState,
    infra::{
        config::Config,
        seed::{SeedFile, seed},
        startup::build_router,
    },
};

/// Counts executor reads so tests can prove a request never reached it.
#[derive(Debug, Default)]
pub struct CountingRepository {
    inner: InMemoryContentRepository,
    finds: AtomicUsize,
}

#[allow(unused)]
impl CountingRepository {
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentRepository for CountingRepository {
    async fn find(&self, query: &ShapedQuery) -> portico_core::Result<QueryEnvelope> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find(query).await
    }

    async fn create(&self, collection: &str, document: Value) -> portico_core::Result<Value> {
        self.inner.create(collection, document).await
    }

    async fn update(
        &self,
        collection: &str,
        document_id: &str,
        changes: Value,
    ) -> portico_core::Result<Value> {
        self.inner.update(collection, document_id, changes).await
    }

    async fn delete(&self, collection: &str, document_id: &str) -> portico_core::Result<Value> {
        self.inner.delete(collection, document_id).await
    }
}

/// A statistics store whose reads always fail.
#[derive(Debug, Default)]
pub struct UnavailableStatisticsStore;

#[async_trait]
impl StatisticsStore for UnavailableStatisticsStore {
    async fn find_one(&self, _key: StatsKey) -> portico_core::Result<Option<StatisticsRecord>> {
        Err(ContentError::Internal("connection refused".into()))
    }

    async fn create(&self, _key: StatsKey, _data: Value) -> portico_core::Result<StatisticsRecord> {
        Err(ContentError::Internal("connection refused".into()))
    }

    async fn update(&self, _id: i64, _data: Value) -> portico_core::Result<StatisticsRecord> {
        Err(ContentError::Internal("connection refused".into()))
    }
}

#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub repository: Arc<CountingRepository>,
}

#[allow(unused)]
pub fn build_test_app() -> Result<TestApp> {
    build_test_app_with_statistics(Arc::new(InMemoryStatisticsStore::new()))
}

#[allow(unused)]
pub fn build_test_app_with_statistics(statistics: Arc<dyn StatisticsStore>) -> Result<TestApp> {
    let repository = Arc::new(CountingRepository::default());
    let content: Arc<dyn ContentRepository> = repository.clone();
    let state = AppState::new(Arc::new(Config::default()), content, statistics);
    let server =
        TestServer::new(build_router(state.clone())).map_err(|err| anyhow!(err.to_string()))?;
    Ok(TestApp {
        server,
        state,
        repository,
    })
}

#[allow(unused)]
pub async fn seed_fixtures(state: &AppState) -> Result<()> {
    let entries: SeedFile = serde_json::from_value(fixtures())?;
    seed(state, entries).await?;
    Ok(())
}

/// An upload with every rendition; `size` is in KB.
pub fn image(stem: &str, size: f64) -> Value {
    json!({
        "url": format!("/uploads/{stem}.png"),
        "name": format!("{stem}.png"),
        "alternativeText": null,
        "caption": null,
        "width": 2400,
        "height": 1600,
        "mime": "image/png",
        "size": size,
        "formats": {
            "thumbnail": { "url": format!("/uploads/thumbnail_{stem}.png"), "mime": "image/png", "size": 6.1, "width": 234, "height": 156 },
            "small": { "url": format!("/uploads/small_{stem}.png"), "mime": "image/png", "size": 31.4, "width": 500, "height": 333 },
            "medium": { "url": format!("/uploads/medium_{stem}.png"), "mime": "image/png", "size": 80.2, "width": 750, "height": 500 },
            "large": { "url": format!("/uploads/large_{stem}.png"), "mime": "image/png", "size": 142.9, "width": 1000, "height": 667 }
        }
    })
}

fn fixtures() -> Value {
    json!({
        "news": [
            { "documentId": "news-1", "title": "Lab opening", "date": "2024-01-15", "news_content": "We opened.", "cover_picture": image("opening", 420.0) },
            { "documentId": "news-2", "title": "Grant awarded", "date": "2024-05-02", "news_content": "Funded.", "cover_picture": image("award", 380.0) },
            { "documentId": "news-3", "title": "Summer school", "date": "2023-07-20", "news_content": "Join us.", "cover_picture": image("school", 220.0) },
            { "documentId": "news-4", "title": "Paper accepted", "date": "2024-09-10", "news_content": "Accepted.", "cover_picture": image("paper", 150.0) }
        ],
        "publics": [
            {
                "title": "Deep soil sensing", "journal_name": "Sensors", "impact_factor": 3.9,
                "indexing_classification": "WWoS Q1", "publication_type": "Journal",
                "publishedAt": "2022-03-01T00:00:00.000Z", "cover_picture": image("soil", 90.0)
            },
            {
                "title": "Cancer cell imaging", "journal_name": "Oncology Today", "impact_factor": 7.2,
                "indexing_classification": "WWoS Q2", "publication_type": "Journal",
                "publishedAt": "2022-11-20T00:00:00.000Z", "cover_picture": image("cells", 75.0)
            },
            {
                "title": "Edge inference", "journal_name": "Conference on Systems", "impact_factor": 1.1,
                "indexing_classification": "Conference Paper", "publication_type": "Conference",
                "publishedAt": "2023-06-05T00:00:00.000Z"
            }
        ],
        "grants-n-projects": [
            {
                "documentId": "grant-1", "project_title": "Rain models", "pi_name": "Dr. Hana",
                "total_funding": 120000, "type_of_grants": "national grants", "on_time": true,
                "grant_scheme_name": "FRGS", "start_date": "2021-01-01", "end_date": "2023-12-31",
                "project_output": { "master": 2, "phd": 1, "paper_citation": [{ "title": "a" }], "patent_citation": [] }
            },
            {
                "documentId": "grant-2", "project_title": "Crop yield", "pi_name": "Dr. Idris",
                "total_funding": "80000", "type_of_grants": "industry grants", "on_time": false,
                "grant_scheme_name": "Industry", "start_date": "2024-02-01", "end_date": "2025-01-31"
            }
        ],
        "collaborators": [
            { "documentId": "collab-1", "name": "Acme Labs", "link": "https://acme.test", "description": "Partner", "logo": image("acme", 40.0) }
        ]
    })
}
