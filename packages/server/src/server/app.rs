//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::kernel::{ProgressHub, ServerDeps, WatchOptions};
use crate::server::routes::{check_links_handler, extract_handler, health_handler, progress_handler};
use crate::server::static_files::serve_public;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    pub progress: ProgressHub,
    pub watch: WatchOptions,
}

impl AxumAppState {
    pub fn new(deps: ServerDeps, progress: ProgressHub, watch: WatchOptions) -> Self {
        Self {
            deps: Arc::new(deps),
            progress,
            watch,
        }
    }

    /// State for the real providers, from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let deps = ServerDeps::from_config(config)?;
        let progress = ProgressHub::with_retention(config.progress_retention);
        let watch = WatchOptions {
            interval: config.progress_interval,
            idle_timeout: config.progress_idle_timeout,
        };
        Ok(Self::new(deps, progress, watch))
    }
}

/// Build the Axum application router
pub fn build_app(state: AxumAppState) -> Router {
    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/check-links", post(check_links_handler))
        .route("/progress", get(progress_handler))
        .route("/extract-domains", post(extract_handler))
        .route("/health", get(health_handler))
        // Browser page (index.html, script.js, style.css)
        .fallback(serve_public)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
