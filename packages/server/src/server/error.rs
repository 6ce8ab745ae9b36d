//! Errors returned to HTTP clients as `{"error": "..."}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const INVALID_URLS: &str = "Invalid input: 'urls' must be a non-empty array.";
pub const INVALID_FILTERS: &str = "Invalid input: 'filters' must be an object of booleans.";
pub const NO_FILTER_SELECTED: &str = "Invalid input: at least one filter must be selected.";
pub const INVALID_TEXT: &str = "Invalid input: 'text' must be a string.";
pub const INVALID_BATCH_ID: &str = "Invalid input: 'batchId' must be a UUID.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
