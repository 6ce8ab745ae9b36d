//! POST /check-links
//!
//! Body: `{urls: string[], filters?: {lightspeed, fortiguard}, batchId?: uuid}`.
//! Clients that want live progress pick a `batchId`, open
//! `/progress?batch=<batchId>`, then post the batch.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domains::link_check::{check_links, BatchRequest, DomainResult, Filters};
use crate::server::app::AxumAppState;
use crate::server::error::{
    ApiError, INVALID_BATCH_ID, INVALID_FILTERS, INVALID_URLS, NO_FILTER_SELECTED,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckLinksResponse {
    pub batch_id: Uuid,
    pub domains: Vec<DomainResult>,
}

/// Validate a raw request body into a batch.
pub fn parse_request(body: &Value) -> Result<BatchRequest, ApiError> {
    let urls = body
        .get("urls")
        .and_then(Value::as_array)
        .filter(|urls| !urls.is_empty())
        .ok_or(ApiError::InvalidInput(INVALID_URLS))?
        .iter()
        .map(|url| url.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()
        .ok_or(ApiError::InvalidInput(INVALID_URLS))?;

    let filters = match body.get("filters") {
        None | Some(Value::Null) => Filters::default(),
        Some(raw) => serde_json::from_value::<Filters>(raw.clone())
            .map_err(|_| ApiError::InvalidInput(INVALID_FILTERS))?,
    };
    if filters.is_empty() {
        return Err(ApiError::InvalidInput(NO_FILTER_SELECTED));
    }

    let mut request = BatchRequest::new(urls, filters);
    match body.get("batchId") {
        None | Some(Value::Null) => {}
        Some(raw) => {
            let batch_id = serde_json::from_value::<Uuid>(raw.clone())
                .map_err(|_| ApiError::InvalidInput(INVALID_BATCH_ID))?;
            request = request.with_batch_id(batch_id);
        }
    }

    Ok(request)
}

/// Run a batch and return every domain's result in input order.
///
/// The batch runs on its own task: a client that disconnects does not stop
/// the provider calls, and progress streams still see it finish.
pub async fn check_links_handler(
    Extension(state): Extension<AxumAppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CheckLinksResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected check-links body");
        ApiError::InvalidInput(INVALID_URLS)
    })?;

    let request = parse_request(&body)?;
    let batch_id = request.batch_id;

    let deps = state.deps.clone();
    let hub = state.progress.clone();
    let domains = tokio::spawn(async move { check_links(&deps, &hub, request).await })
        .await
        .map_err(|e| ApiError::Internal(format!("batch {} task failed: {}", batch_id, e)))?;

    Ok(Json(CheckLinksResponse { batch_id, domains }))
}
