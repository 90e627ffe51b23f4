use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use paperboy_api::create_app;
use paperboy_core::config::ApiConfig;
use paperboy_testing_utils::{MockSummaryRepository, SummaryBuilder};

fn seeded_store() -> MockSummaryRepository {
    let summaries = (1..=4)
        .map(|hour| {
            SummaryBuilder::new(&format!("world/{hour}"))
                .with_title(&format!("World story {hour}"))
                .with_date(Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap())
                .build()
        })
        .chain(std::iter::once(
            SummaryBuilder::new("tech/1")
                .with_section("technology", "Technology")
                .with_title("Chip shortage eases")
                .with_date(Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap())
                .build(),
        ))
        .collect();

    MockSummaryRepository::with_summaries(summaries)
}

fn app(store: &MockSummaryRepository) -> Router {
    let config = ApiConfig {
        default_page_size: 2,
        max_page_size: 3,
        ..Default::default()
    };
    create_app(Arc::new(store.clone()), &config)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn ids(summaries: &Value) -> Vec<String> {
    summaries
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["info"]["content_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get(app(&MockSummaryRepository::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_summary_by_id() {
    let store = seeded_store();

    let (status, body) = get(app(&store), "/api/summary?id=tech/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["title"], "Chip shortage eases");

    let (status, body) = get(app(&store), "/api/summary?id=tech/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "NOT_FOUND");

    let (status, _) = get(app(&store), "/api/summary").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_section_pages_follow_last_cursor() {
    let store = seeded_store();

    let (status, first) = get(app(&store), "/api/summaries/world").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&first["summaries"]), vec!["world/4", "world/3"]);

    let before = first["last"].as_str().unwrap().to_string();
    let (_, second) = get(
        app(&store),
        &format!("/api/summaries/world?before={}", before.replace('+', "%2B")),
    )
    .await;
    assert_eq!(ids(&second["summaries"]), vec!["world/2", "world/1"]);
}

#[tokio::test]
async fn test_all_sections_and_page_size() {
    let store = seeded_store();

    let (_, page) = get(app(&store), "/api/summaries/all?size=3").await;
    assert_eq!(ids(&page["summaries"]), vec!["tech/1", "world/4", "world/3"]);

    // 超过上限时截断
    let (_, page) = get(app(&store), "/api/summaries/all?size=100").await;
    assert_eq!(page["summaries"].as_array().unwrap().len(), 3);

    let (status, page) = get(app(&store), "/api/summaries/all?size=lots").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["summaries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_before_is_bad_request() {
    let (status, body) = get(app(&seeded_store()), "/api/summaries/world?before=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn test_search() {
    let store = seeded_store();

    let (status, body) = get(app(&store), "/api/summaries?q=chip").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["tech/1"]);
    assert_eq!(store.search_calls(), 1);
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let store = seeded_store();
    store.set_fail_reads(true);

    let (status, body) = get(app(&store), "/api/summaries/world").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "STORE_ERROR");
}
