//! Test harness: the full router wired to mock providers.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no socket is bound.

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use server_core::kernel::{MockCategoryProvider, ProgressHub, TestDependencies, WatchOptions};
use server_core::server::{build_app, AxumAppState};
use tower::ServiceExt;

pub struct TestHarness {
    pub app: Router,
    pub deps: TestDependencies,
    pub progress: ProgressHub,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_deps(TestDependencies::new())
    }

    pub fn with_providers(
        lightspeed: MockCategoryProvider,
        fortiguard: MockCategoryProvider,
    ) -> Self {
        Self::with_deps(TestDependencies::with_providers(lightspeed, fortiguard))
    }

    pub fn with_deps(deps: TestDependencies) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let progress = ProgressHub::new();
        let watch = WatchOptions {
            interval: Duration::from_millis(5),
            idle_timeout: Duration::from_millis(200),
        };
        let state = AxumAppState::new(deps.server_deps(1), progress.clone(), watch);

        Self {
            app: build_app(state),
            deps,
            progress,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn post_raw(&self, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        get(self.app.clone(), uri).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }
}

/// GET `uri`, returning status, content type and the full body.
///
/// Takes the router by value so it can run on a spawned task.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

/// The JSON payloads of every `data:` line in an SSE body.
pub fn sse_payloads(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}
