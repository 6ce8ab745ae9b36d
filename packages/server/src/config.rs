use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub lightspeed_api_url: String,
    pub lightspeed_api_key: Option<String>,
    pub lightspeed_categories_path: Option<PathBuf>,
    pub fortiguard_api_url: String,
    pub fortiguard_cookie: String,
    pub provider_timeout: Option<Duration>,
    pub batch_concurrency: usize,
    pub progress_interval: Duration,
    pub progress_idle_timeout: Duration,
    pub progress_retention: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            lightspeed_api_url: filter_client::lightspeed::DEFAULT_ENDPOINT.to_string(),
            lightspeed_api_key: None,
            lightspeed_categories_path: None,
            fortiguard_api_url: filter_client::fortiguard::DEFAULT_ENDPOINT.to_string(),
            fortiguard_cookie: filter_client::fortiguard::DEFAULT_COOKIE.to_string(),
            provider_timeout: None,
            batch_concurrency: 1,
            progress_interval: Duration::from_millis(100),
            progress_idle_timeout: Duration::from_secs(300),
            progress_retention: Duration::from_secs(600),
        }
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        _ => Ok(default),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        let provider_timeout = match non_empty_var("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("PROVIDER_TIMEOUT_SECS must be a valid number")?,
            )),
            None => None,
        };

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            lightspeed_api_url: non_empty_var("LIGHTSPEED_API_URL")
                .unwrap_or(defaults.lightspeed_api_url),
            lightspeed_api_key: non_empty_var("LIGHTSPEED_API_KEY"),
            lightspeed_categories_path: non_empty_var("LIGHTSPEED_CATEGORIES_PATH")
                .map(PathBuf::from),
            fortiguard_api_url: non_empty_var("FORTIGUARD_API_URL")
                .unwrap_or(defaults.fortiguard_api_url),
            fortiguard_cookie: non_empty_var("FORTIGUARD_COOKIE")
                .unwrap_or(defaults.fortiguard_cookie),
            provider_timeout,
            batch_concurrency: parse_var("BATCH_CONCURRENCY", defaults.batch_concurrency)?.max(1),
            progress_interval: Duration::from_millis(parse_var("PROGRESS_INTERVAL_MS", 100u64)?),
            progress_idle_timeout: Duration::from_secs(parse_var(
                "PROGRESS_IDLE_TIMEOUT_SECS",
                300u64,
            )?),
            progress_retention: Duration::from_secs(parse_var("PROGRESS_RETENTION_SECS", 600u64)?),
        })
    }
}
