//! Domain extraction, health check and the embedded browser page.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

#[tokio::test]
async fn extract_domains_dedupes_in_first_seen_order() {
    let harness = TestHarness::new();

    let (status, body) = harness
        .post_json(
            "/extract-domains",
            json!({"text": "Visit https://example.com/page and docs.example.org, then example.com again"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"domains": ["example.com", "docs.example.org"]})
    );
}

#[tokio::test]
async fn extract_domains_without_matches_is_empty() {
    let harness = TestHarness::new();

    let (status, body) = harness
        .post_json("/extract-domains", json!({"text": "nothing to see here"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"domains": []}));
}

#[tokio::test]
async fn extract_domains_rejects_malformed_body_as_json_error() {
    let harness = TestHarness::new();

    let (status, body) = harness.post_raw("/extract-domains", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"error": "Invalid input: 'text' must be a string."})
    );

    let (status, body) = harness
        .post_json("/extract-domains", json!({"text": 42}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input: 'text' must be a string.");
}

#[tokio::test]
async fn health_reports_tracked_batches() {
    let harness = TestHarness::new();
    harness
        .post_json("/check-links", json!({"urls": ["a.com"]}))
        .await;

    let (status, _, body) = harness.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["trackedBatches"], 1);
    assert!(body["checkedAt"].is_string());
}

#[tokio::test]
async fn root_serves_the_checker_page() {
    let harness = TestHarness::new();

    let (status, content_type, body) = harness.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("id=\"inputText\""));
    assert!(body.contains("id=\"copyLightspeedUnblocked\""));
}

#[tokio::test]
async fn page_assets_are_served_with_their_types() {
    let harness = TestHarness::new();

    let (status, content_type, body) = harness.get("/script.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().contains("javascript"));
    assert!(body.contains("/check-links"));

    // Empty input is caught in the page before any request goes out.
    let check = body.find("async function checkLinks").unwrap();
    let extract = check + body[check..].find("extractDomains(").unwrap();
    let first_fetch = check + body[check..].find("fetch(").unwrap();
    assert!(extract < first_fetch);
    assert!(body.contains("/([a-zA-Z0-9-]+(\\.[a-zA-Z]{2,}){1,2})/g"));
    assert!(!body.contains("/extract-domains"));

    let (status, content_type, _) = harness.get("/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/css"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let harness = TestHarness::new();

    let (status, _, _) = harness.get("/no-such-page.html").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
