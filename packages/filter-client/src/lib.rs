//! Clients for the two web-filter categorization services.
//!
//! Each client turns a hostname into a [`ProviderResult`]: whether the filter
//! would let the domain through, and the category it files the domain under.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use filter_client::{CategoryNames, CategoryProvider, FortiGuardClient, LightspeedClient};
//!
//! let names = Arc::new(CategoryNames::from_json(r#"{"9": "education"}"#)?);
//! let lightspeed = LightspeedClient::new(names);
//! let fortiguard = FortiGuardClient::new();
//!
//! let result = fortiguard.categorize("example.com").await?;
//! println!("{} ({})", result.status, result.category);
//! ```

pub mod categories;
pub mod error;
pub mod fortiguard;
pub mod lightspeed;
pub mod types;

pub use categories::{CategoryNames, FORTIGUARD_UNBLOCKED, LIGHTSPEED_UNBLOCKED};
pub use error::{FilterError, Result};
pub use fortiguard::FortiGuardClient;
pub use lightspeed::{LightspeedClient, SlotCode};
pub use types::{FilterStatus, Provider, ProviderResult};

use async_trait::async_trait;

/// A web-filter service that can categorize a hostname.
///
/// `Ok` covers both a real classification and a soft failure
/// ([`FilterStatus::Unknown`]). `Err` is a hard failure: the service could
/// not be reached or answered with something that is not the expected JSON.
#[async_trait]
pub trait CategoryProvider: Send + Sync {
    /// Which service this is.
    fn provider(&self) -> Provider;

    /// Look up a bare hostname (no scheme, no trailing slash).
    async fn categorize(&self, hostname: &str) -> Result<ProviderResult>;
}
