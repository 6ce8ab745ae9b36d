//! SSE progress endpoint.
//!
//! GET /progress?batch=<uuid>
//!
//! Streams `data: {"percentage": N}` for one batch and closes once the batch
//! completes. Without `batch`, follows the most recently started batch.
//! EventSource can't send custom headers, so the token travels as a query param.

use std::convert::Infallible;

use axum::{
    extract::{Extension, Query},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::kernel::{ProgressMessage, WatchTarget};
use crate::server::app::AxumAppState;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    /// Batch token, as sent in the check-links body
    batch: Option<Uuid>,
}

/// SSE progress handler.
///
/// The poll timer lives inside the stream, so it stops when the client
/// disconnects and axum drops the response.
pub async fn progress_handler(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<ProgressQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let target = query
        .batch
        .map(WatchTarget::Batch)
        .unwrap_or(WatchTarget::Latest);

    tracing::debug!(?target, "Progress stream opened");

    let updates = state.progress.watch(target, state.watch).await;

    let events = updates.filter_map(|snapshot| async move {
        Event::default()
            .json_data(ProgressMessage::from(snapshot))
            .ok()
            .map(Ok)
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
