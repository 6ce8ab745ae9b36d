//! Server dependencies for the link checker (using traits for testability)
//!
//! Both categorization services sit behind `CategoryProvider` so tests can
//! swap in `MockCategoryProvider`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use filter_client::{
    CategoryNames, CategoryProvider, FortiGuardClient, LightspeedClient, Provider,
};

use crate::config::Config;
use crate::server::static_files::PublicAssets;

/// Name of the bundled Lightspeed code-to-name table.
pub const LIGHTSPEED_CATEGORIES_ASSET: &str = "lightspeed-categories.json";

/// Dependencies shared by every batch
#[derive(Clone)]
pub struct ServerDeps {
    pub lightspeed: Arc<dyn CategoryProvider>,
    pub fortiguard: Arc<dyn CategoryProvider>,
    /// Domains in flight per batch (1 = strictly sequential)
    pub batch_concurrency: usize,
}

impl ServerDeps {
    pub fn new(
        lightspeed: Arc<dyn CategoryProvider>,
        fortiguard: Arc<dyn CategoryProvider>,
        batch_concurrency: usize,
    ) -> Self {
        Self {
            lightspeed,
            fortiguard,
            batch_concurrency: batch_concurrency.max(1),
        }
    }

    /// Build the real HTTP clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let names = Arc::new(load_category_names(
            config.lightspeed_categories_path.as_deref(),
        )?);
        tracing::info!(categories = names.len(), "Lightspeed category names loaded");

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.provider_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create HTTP client")?;

        if config.lightspeed_api_key.is_none() {
            tracing::warn!(
                "LIGHTSPEED_API_KEY not set; Lightspeed lookups will be rejected and reported as Unknown (see .env.example)"
            );
        }

        let lightspeed = LightspeedClient::new(names)
            .with_client(http.clone())
            .with_endpoint(config.lightspeed_api_url.clone())
            .with_api_key(config.lightspeed_api_key.clone());

        let fortiguard = FortiGuardClient::new()
            .with_client(http)
            .with_endpoint(config.fortiguard_api_url.clone())
            .with_cookie(config.fortiguard_cookie.clone());

        Ok(Self::new(
            Arc::new(lightspeed),
            Arc::new(fortiguard),
            config.batch_concurrency,
        ))
    }

    pub fn provider(&self, provider: Provider) -> &Arc<dyn CategoryProvider> {
        match provider {
            Provider::Lightspeed => &self.lightspeed,
            Provider::FortiGuard => &self.fortiguard,
        }
    }
}

/// Load the Lightspeed name table from `path`, or the bundled copy.
pub fn load_category_names(path: Option<&Path>) -> Result<CategoryNames> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category table {}", path.display()))?,
        None => {
            let asset = PublicAssets::get(LIGHTSPEED_CATEGORIES_ASSET)
                .context("Bundled Lightspeed category table is missing")?;
            String::from_utf8(asset.data.into_owned())
                .context("Bundled Lightspeed category table is not UTF-8")?
        }
    };

    CategoryNames::from_json(&json).context("Failed to parse Lightspeed category table")
}
