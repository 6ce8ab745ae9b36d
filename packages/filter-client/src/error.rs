//! Typed errors for the filter clients.

use thiserror::Error;

/// Hard failures while talking to a categorization service.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON, or not the JSON we expected
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but a required part of the payload is missing
    #[error("unexpected response shape: {reason}")]
    Schema { reason: String },

    /// Category table or client setup was invalid
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
