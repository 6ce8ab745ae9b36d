//! SSE progress stream tests.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{sse_payloads, TestHarness};
use filter_client::Provider;
use serde_json::json;
use server_core::kernel::MockCategoryProvider;
use uuid::Uuid;

#[tokio::test]
async fn finished_batch_streams_completion_and_closes() {
    let harness = TestHarness::new();
    let batch_id = Uuid::new_v4();

    let (status, _) = harness
        .post_json(
            "/check-links",
            json!({"urls": ["a.com", "b.com", "c.com"], "batchId": batch_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, content_type, body) = harness
        .get(&format!("/progress?batch={}", batch_id))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/event-stream"));
    assert_eq!(sse_payloads(&body), vec![json!({"percentage": 100})]);
}

#[tokio::test]
async fn stream_opened_before_batch_reports_rising_progress() {
    let harness = TestHarness::with_providers(
        MockCategoryProvider::new(Provider::Lightspeed).with_delay(Duration::from_millis(30)),
        MockCategoryProvider::new(Provider::FortiGuard),
    );
    let batch_id = Uuid::new_v4();

    let progress = {
        let app = harness.app.clone();
        let uri = format!("/progress?batch={}", batch_id);
        tokio::spawn(async move { common::get(app, &uri).await.2 })
    };

    // Let the stream register its first (idle) reading.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let (status, _) = harness
        .post_json(
            "/check-links",
            json!({"urls": ["a.com", "b.com", "c.com", "d.com"], "batchId": batch_id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let payloads = sse_payloads(&progress.await.unwrap());
    let percentages: Vec<u64> = payloads
        .iter()
        .map(|p| p["percentage"].as_u64().unwrap())
        .collect();

    assert_eq!(percentages.first(), Some(&0));
    assert_eq!(percentages.last(), Some(&100));
    assert!(percentages.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn unknown_batch_reports_idle_then_times_out() {
    let harness = TestHarness::new();

    let (status, _, body) = harness
        .get(&format!("/progress?batch={}", Uuid::new_v4()))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sse_payloads(&body), vec![json!({"percentage": 0})]);
}

#[tokio::test]
async fn invalid_batch_token_is_rejected() {
    let harness = TestHarness::new();

    let (status, _, _) = harness.get("/progress?batch=not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
