// TestDependencies - mock implementations for testing
//
// Provides a mock categorization service that can be injected into ServerDeps for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use filter_client::{CategoryProvider, FilterError, Provider, ProviderResult};

use super::ServerDeps;

/// What a mock provider does for one hostname
#[derive(Debug, Clone)]
enum MockOutcome {
    Result(ProviderResult),
    /// Hard failure, as if the service were unreachable
    Fail(String),
    /// Panic inside the provider call
    Panic,
}

pub struct MockCategoryProvider {
    provider: Provider,
    outcomes: Arc<Mutex<HashMap<String, MockOutcome>>>,
    fallback: ProviderResult,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockCategoryProvider {
    /// A provider that answers `Unblocked / Test` for every hostname.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            fallback: ProviderResult::new(filter_client::FilterStatus::Unblocked, "Test"),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_result(self, hostname: &str, result: ProviderResult) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(hostname.to_string(), MockOutcome::Result(result));
        self
    }

    pub fn with_failure(self, hostname: &str) -> Self {
        self.outcomes.lock().unwrap().insert(
            hostname.to_string(),
            MockOutcome::Fail(format!("connection refused for {}", hostname)),
        );
        self
    }

    pub fn with_panic(self, hostname: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(hostname.to_string(), MockOutcome::Panic);
        self
    }

    /// Result for hostnames without a configured outcome.
    pub fn with_fallback(mut self, result: ProviderResult) -> Self {
        self.fallback = result;
        self
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hostnames looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CategoryProvider for MockCategoryProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn categorize(&self, hostname: &str) -> filter_client::Result<ProviderResult> {
        self.calls.lock().unwrap().push(hostname.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.outcomes.lock().unwrap().get(hostname).cloned();
        match outcome {
            Some(MockOutcome::Result(result)) => Ok(result),
            Some(MockOutcome::Fail(reason)) => Err(FilterError::Config(reason)),
            Some(MockOutcome::Panic) => panic!("mock provider panicked for {}", hostname),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Mocks wired into ServerDeps, with handles kept for call assertions
pub struct TestDependencies {
    pub lightspeed: Arc<MockCategoryProvider>,
    pub fortiguard: Arc<MockCategoryProvider>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self::with_providers(
            MockCategoryProvider::new(Provider::Lightspeed),
            MockCategoryProvider::new(Provider::FortiGuard),
        )
    }

    pub fn with_providers(
        lightspeed: MockCategoryProvider,
        fortiguard: MockCategoryProvider,
    ) -> Self {
        Self {
            lightspeed: Arc::new(lightspeed),
            fortiguard: Arc::new(fortiguard),
        }
    }

    pub fn server_deps(&self, batch_concurrency: usize) -> ServerDeps {
        ServerDeps::new(
            self.lightspeed.clone(),
            self.fortiguard.clone(),
            batch_concurrency,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
