//! End-to-end client resolution against closure and fixture data sources.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use matterdesk::config::ResolverConfig;
use matterdesk::error::{ResolutionError, SourceError};
use matterdesk::resolver::{
    ClientDataSource, ClientResolver, FixtureLookup, LookupQuery, QueryState,
};
use serde_json::json;

fn fixture_source() -> ClientDataSource {
    let fixture = FixtureLookup::from_json_str(
        r#"{
            "projects": {
                "M-100": {"matterNumber": "M-100", "property": "12 Harbour St", "stage": "exchange"}
            },
            "clients": {
                "C-7": {"client": {"id": "C-7", "name": "Jane Citizen"}, "data": {"id": "wrong"}},
                "M-200": {"project": {"matterNumber": "M-200", "name": "Estate of Smith"}}
            }
        }"#,
    )
    .expect("fixture parses");
    ClientDataSource::from_lookup(Arc::new(fixture))
}

#[tokio::test]
async fn commercial_lookup_returns_full_project_data() {
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(fixture_source());
    let query = LookupQuery::new(Some("C-7"), Some("M-100"), "commercial");

    let record = resolver.resolve(&query).await.expect("commercial resolves");
    assert_eq!(record["property"], "12 Harbour St");
}

#[tokio::test]
async fn commercial_lookup_never_fails() {
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(fixture_source());

    for (client_id, matter_number) in [
        (Some("C-404"), None),
        (None, Some("M-404")),
        (Some("C-404"), Some("M-404")),
    ] {
        let query = LookupQuery::new(client_id, matter_number, "commercial");
        let record = resolver.resolve(&query).await.expect("stub fallback");
        assert_eq!(
            record,
            json!({"id": client_id, "matterNumber": matter_number}),
            "stub for {query}"
        );
    }
}

#[tokio::test]
async fn client_payload_unwraps_client_before_data() {
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(fixture_source());
    let query = LookupQuery::new(Some("C-7"), None, "residential");

    let record = resolver.resolve(&query).await.expect("client found");
    assert_eq!(record, json!({"id": "C-7", "name": "Jane Citizen"}));
}

#[tokio::test]
async fn matter_number_is_tried_when_client_id_misses() {
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(fixture_source());
    let query = LookupQuery::new(Some("C-404"), Some("M-200"), "wills");

    let record = resolver.resolve(&query).await.expect("found by matter number");
    assert_eq!(record["name"], "Estate of Smith");
}

#[tokio::test(start_paused = true)]
async fn exhausted_non_commercial_lookup_is_not_found() {
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(fixture_source());
    let query = LookupQuery::new(Some("C-404"), Some("M-404"), "residential");

    let err = resolver.resolve(&query).await.expect_err("nothing to find");
    assert!(matches!(err, ResolutionError::NotFound { .. }));
    assert!(matches!(resolver.state(&query), QueryState::Error(_)));
}

#[tokio::test(start_paused = true)]
async fn failing_source_is_isolated_per_strategy() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let source = ClientDataSource::new().with_client_all_data(move |key| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if key == "C-1" {
                Err(SourceError::Failed(format!("backend error on attempt {attempt}")))
            } else {
                Ok(Some(json!({"data": {"matter": key}})))
            }
        }
    });
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(source);
    let query = LookupQuery::new(Some("C-1"), Some("M-1"), "residential");

    let record = resolver.resolve(&query).await.expect("second strategy recovers");
    assert_eq!(record, json!({"matter": "M-1"}));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn repeated_resolution_inside_freshness_window_fetches_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let source = ClientDataSource::new().with_project_full_data(move |key| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(Some(json!({"matterNumber": key})))
        }
    });
    let resolver = ClientResolver::new(ResolverConfig::default()).with_source(source);
    let query = LookupQuery::new(None, Some("M-1"), "commercial");

    let (first, second) = tokio::join!(resolver.resolve(&query), resolver.resolve(&query));
    assert_eq!(first.expect("first"), second.expect("second"));
    resolver.resolve(&query).await.expect("cached");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(5 * 60)).await;
    resolver.resolve(&query).await.expect("refetched");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_source_disables_resolution() {
    let resolver = ClientResolver::new(ResolverConfig::default());
    let query = LookupQuery::new(Some("C-7"), None, "residential");

    assert!(!resolver.is_enabled(&query));
    assert_eq!(resolver.state(&query), QueryState::Disabled);
    let err = resolver.resolve(&query).await.expect_err("disabled");
    assert!(matches!(err, ResolutionError::SourceUnavailable { .. }));
}
