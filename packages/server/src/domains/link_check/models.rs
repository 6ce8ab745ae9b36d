use filter_client::{Provider, ProviderResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which providers a batch should consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub lightspeed: bool,
    pub fortiguard: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            lightspeed: true,
            fortiguard: true,
        }
    }
}

impl Filters {
    pub fn only(provider: Provider) -> Self {
        Self {
            lightspeed: provider == Provider::Lightspeed,
            fortiguard: provider == Provider::FortiGuard,
        }
    }

    pub fn includes(&self, provider: Provider) -> bool {
        match provider {
            Provider::Lightspeed => self.lightspeed,
            Provider::FortiGuard => self.fortiguard,
        }
    }

    /// Selected providers in invocation order (lightspeed first).
    pub fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.includes(*p))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.lightspeed && !self.fortiguard
    }
}

/// Outcome for one domain. A provider's field is present exactly when that
/// provider was selected for the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainResult {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightspeed: Option<ProviderResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fortiguard: Option<ProviderResult>,
}

impl DomainResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            lightspeed: None,
            fortiguard: None,
        }
    }

    /// Every selected provider recorded as `Error`.
    pub fn failed(url: impl Into<String>, filters: Filters) -> Self {
        let mut result = Self::new(url);
        for provider in filters.providers() {
            result.set(provider, ProviderResult::error());
        }
        result
    }

    pub fn get(&self, provider: Provider) -> Option<&ProviderResult> {
        match provider {
            Provider::Lightspeed => self.lightspeed.as_ref(),
            Provider::FortiGuard => self.fortiguard.as_ref(),
        }
    }

    pub fn set(&mut self, provider: Provider, result: ProviderResult) {
        match provider {
            Provider::Lightspeed => self.lightspeed = Some(result),
            Provider::FortiGuard => self.fortiguard = Some(result),
        }
    }

    pub fn is_unblocked_by(&self, provider: Provider) -> bool {
        self.get(provider).map(|r| r.is_unblocked()).unwrap_or(false)
    }
}

/// A validated batch, ready for the orchestrator.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub batch_id: Uuid,
    pub urls: Vec<String>,
    pub filters: Filters,
}

impl BatchRequest {
    pub fn new(urls: Vec<String>, filters: Filters) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            urls,
            filters,
        }
    }

    pub fn with_batch_id(mut self, batch_id: Uuid) -> Self {
        self.batch_id = batch_id;
        self
    }
}
