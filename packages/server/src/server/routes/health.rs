use axum::{extract::Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    /// Running or recently finished batches still held by the progress hub
    tracked_batches: usize,
    checked_at: DateTime<Utc>,
}

/// Health check endpoint
///
/// The server has no backing store, so being able to answer is the check.
pub async fn health_handler(Extension(state): Extension<AxumAppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        tracked_batches: state.progress.len().await,
        checked_at: Utc::now(),
    })
}
