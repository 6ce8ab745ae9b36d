use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};

use crate::domains::link_check::extract_domains;
use crate::server::error::{ApiError, INVALID_TEXT};

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub domains: Vec<String>,
}

/// POST /extract-domains - unique domains found in free-form text.
///
/// An empty list is the empty-input condition, not an error.
pub async fn extract_handler(
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected extract-domains body");
        ApiError::InvalidInput(INVALID_TEXT)
    })?;

    let domains = extract_domains(&request.text);
    tracing::debug!(count = domains.len(), "Extracted domains");
    Ok(Json(ExtractResponse { domains }))
}
