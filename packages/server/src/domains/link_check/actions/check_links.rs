//! Check links action - runs one batch of domains through the selected providers

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use filter_client::{CategoryProvider, FilterStatus, ProviderResult};
use futures::{stream, FutureExt, StreamExt};
use tracing::{debug, error, info, warn};

use crate::domains::link_check::extract::clean_url;
use crate::domains::link_check::models::{BatchRequest, DomainResult, Filters};
use crate::kernel::{BatchProgress, ProgressHub, ServerDeps};

/// Check every domain in the batch.
///
/// This action:
/// 1. Registers the batch's progress at `{0, len(urls)}`
/// 2. Cleans each URL and asks the selected providers, lightspeed first
/// 3. Counts each domain as complete however its checks ended
///
/// Results come back in input order. At most `deps.batch_concurrency`
/// domains are in flight at once. Provider failures never abort the batch;
/// they show up as `Error` results for that domain.
pub async fn check_links(
    deps: &ServerDeps,
    hub: &ProgressHub,
    request: BatchRequest,
) -> Vec<DomainResult> {
    let BatchRequest {
        batch_id,
        urls,
        filters,
    } = request;

    info!(
        %batch_id,
        domains = urls.len(),
        concurrency = deps.batch_concurrency,
        providers = ?filters.providers(),
        "Starting link check batch"
    );

    let progress = hub.begin(batch_id, urls.len()).await;
    let progress = &progress;

    let results: Vec<DomainResult> = stream::iter(urls)
        .map(move |url| check_domain(deps, filters, url, progress))
        .buffered(deps.batch_concurrency.max(1))
        .collect()
        .await;

    info!(
        batch_id = %progress.id(),
        domains = results.len(),
        elapsed_ms = (Utc::now() - progress.started_at()).num_milliseconds(),
        "Link check batch complete"
    );

    results
}

async fn check_domain(
    deps: &ServerDeps,
    filters: Filters,
    url: String,
    progress: &Arc<BatchProgress>,
) -> DomainResult {
    let _completion = progress.completion_guard();

    let host = clean_url(&url);
    debug!(domain = %host, "Processing domain");

    let outcome = AssertUnwindSafe(categorize_domain(deps, filters, &host))
        .catch_unwind()
        .await;

    match outcome {
        Ok(result) => result,
        Err(panic_info) => {
            error!(
                domain = %host,
                panic = %panic_message(&panic_info),
                "Domain check panicked"
            );
            DomainResult::failed(host, filters)
        }
    }
}

async fn categorize_domain(deps: &ServerDeps, filters: Filters, host: &str) -> DomainResult {
    let mut result = DomainResult::new(host);
    for provider in filters.providers() {
        let outcome = classify(deps.provider(provider).as_ref(), host).await;
        result.set(provider, outcome);
    }
    result
}

/// Ask one provider, turning a hard failure into an `Error` result.
async fn classify(provider: &dyn CategoryProvider, host: &str) -> ProviderResult {
    match provider.categorize(host).await {
        Ok(result) => {
            if result.status == FilterStatus::Unknown {
                debug!(domain = %host, provider = %provider.provider(), "No classification");
            }
            result
        }
        Err(e) => {
            warn!(
                domain = %host,
                provider = %provider.provider(),
                error = %e,
                "Provider lookup failed"
            );
            ProviderResult::error()
        }
    }
}

fn panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{MockCategoryProvider, TestDependencies};
    use filter_client::Provider;
    use std::time::Duration;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn results_follow_input_order_and_clean_urls() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps(1);
        let hub = ProgressHub::new();

        let results = check_links(
            &deps,
            &hub,
            BatchRequest::new(
                urls(&["https://b.example.com/", "a.example.org", "http://c.example.net"]),
                Filters::default(),
            ),
        )
        .await;

        let hosts: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(hosts, vec!["b.example.com", "a.example.org", "c.example.net"]);
        assert_eq!(
            test_deps.lightspeed.calls(),
            vec!["b.example.com", "a.example.org", "c.example.net"]
        );
    }

    #[tokio::test]
    async fn every_domain_counts_even_when_all_calls_fail() {
        let test_deps = TestDependencies::with_providers(
            MockCategoryProvider::new(Provider::Lightspeed)
                .with_failure("one.com")
                .with_failure("two.com"),
            MockCategoryProvider::new(Provider::FortiGuard)
                .with_failure("one.com")
                .with_failure("two.com"),
        );
        let deps = test_deps.server_deps(1);
        let hub = ProgressHub::new();
        let request = BatchRequest::new(urls(&["one.com", "two.com"]), Filters::default());
        let batch_id = request.batch_id;

        let results = check_links(&deps, &hub, request).await;

        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.lightspeed, Some(ProviderResult::error()));
            assert_eq!(result.fortiguard, Some(ProviderResult::error()));
        }
        let snapshot = hub.snapshot(batch_id).await.unwrap();
        assert_eq!((snapshot.completed, snapshot.total), (2, 2));
    }

    #[tokio::test]
    async fn panic_degrades_only_that_domain() {
        let test_deps = TestDependencies::with_providers(
            MockCategoryProvider::new(Provider::Lightspeed).with_panic("explode.com"),
            MockCategoryProvider::new(Provider::FortiGuard),
        );
        let deps = test_deps.server_deps(1);
        let hub = ProgressHub::new();
        let request = BatchRequest::new(
            urls(&["fine.com", "explode.com", "also-fine.com"]),
            Filters::default(),
        );
        let batch_id = request.batch_id;

        let results = check_links(&deps, &hub, request).await;

        assert_eq!(results[1], DomainResult::failed("explode.com", Filters::default()));
        assert!(results[0].is_unblocked_by(Provider::FortiGuard));
        assert!(results[2].is_unblocked_by(Provider::Lightspeed));
        assert!(hub.snapshot(batch_id).await.unwrap().is_done());
    }

    #[tokio::test]
    async fn unclassified_domain_is_not_unblocked() {
        let test_deps = TestDependencies::with_providers(
            MockCategoryProvider::new(Provider::Lightspeed)
                .with_fallback(ProviderResult::unknown()),
            MockCategoryProvider::new(Provider::FortiGuard),
        );
        let deps = test_deps.server_deps(1);
        let hub = ProgressHub::new();

        let results = check_links(
            &deps,
            &hub,
            BatchRequest::new(urls(&["mystery.example"]), Filters::default()),
        )
        .await;

        assert_eq!(results[0].lightspeed, Some(ProviderResult::unknown()));
        assert!(!results[0].is_unblocked_by(Provider::Lightspeed));
        assert!(results[0].is_unblocked_by(Provider::FortiGuard));
    }

    #[tokio::test]
    async fn unselected_provider_is_never_called() {
        let test_deps = TestDependencies::new();
        let deps = test_deps.server_deps(1);
        let hub = ProgressHub::new();

        let results = check_links(
            &deps,
            &hub,
            BatchRequest::new(urls(&["example.com"]), Filters::only(Provider::FortiGuard)),
        )
        .await;

        assert_eq!(test_deps.lightspeed.call_count(), 0);
        assert_eq!(test_deps.fortiguard.call_count(), 1);
        assert!(results[0].lightspeed.is_none());
        assert!(results[0].fortiguard.is_some());
    }

    #[tokio::test]
    async fn concurrent_batches_keep_input_order() {
        let test_deps = TestDependencies::with_providers(
            MockCategoryProvider::new(Provider::Lightspeed).with_delay(Duration::from_millis(5)),
            MockCategoryProvider::new(Provider::FortiGuard),
        );
        let deps = test_deps.server_deps(4);
        let hub = ProgressHub::new();
        let input: Vec<String> = (0..10).map(|i| format!("site{}.example.com", i)).collect();

        let results = check_links(
            &deps,
            &hub,
            BatchRequest::new(input.clone(), Filters::default()),
        )
        .await;

        let hosts: Vec<String> = results.into_iter().map(|r| r.url).collect();
        assert_eq!(hosts, input);
    }
}
