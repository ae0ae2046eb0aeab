//! Ordered lookup strategies for client resolution.

use std::future::Future;

use serde_json::{Value, json};

use crate::error::{ResolutionError, SourceError};
use crate::resolver::ClientRecord;
use crate::resolver::query::{LookupQuery, Module};
use crate::resolver::source::ClientDataSource;

/// Wrapper fields probed, in order, on a client payload.
const UNWRAP_PRECEDENCE: &[&str] = &["client", "data", "project"];

/// Run one lookup in isolation. Source errors are logged and read as "no result".
async fn attempt<F>(strategy: &'static str, key: &str, call: F) -> Option<Value>
where
    F: Future<Output = Result<Option<Value>, SourceError>>,
{
    match call.await {
        Ok(Some(value)) if !value.is_null() => Some(value),
        Ok(_) => {
            tracing::debug!(strategy, key, "Client lookup returned no record");
            None
        }
        Err(e) => {
            tracing::warn!(strategy, key, error = %e, "Client lookup failed; trying next strategy");
            None
        }
    }
}

/// First present wrapper field of a client payload, else the payload itself.
pub(crate) fn unwrap_client_payload(raw: Value) -> Value {
    UNWRAP_PRECEDENCE
        .iter()
        .find_map(|field| raw.get(*field).filter(|value| !value.is_null()).cloned())
        .unwrap_or(raw)
}

/// Minimal record returned when the commercial lookup yields nothing.
pub(crate) fn stub_record(query: &LookupQuery) -> ClientRecord {
    json!({
        "id": query.client_id(),
        "matterNumber": query.matter_number(),
    })
}

async fn resolve_commercial(query: &LookupQuery, source: &ClientDataSource) -> ClientRecord {
    if let Some(key) = query.matter_number().or(query.client_id())
        && let Some(record) =
            attempt("project_full_data", key, source.project_full_data(key)).await
    {
        return record;
    }
    tracing::debug!(query = %query, "Falling back to stub commercial record");
    stub_record(query)
}

async fn resolve_client(
    query: &LookupQuery,
    source: &ClientDataSource,
) -> Result<ClientRecord, ResolutionError> {
    for key in [query.client_id(), query.matter_number()]
        .into_iter()
        .flatten()
    {
        if let Some(raw) = attempt("client_all_data", key, source.client_all_data(key)).await {
            return Ok(unwrap_client_payload(raw));
        }
    }

    Err(ResolutionError::NotFound {
        key: query.to_string(),
    })
}

/// Run the fallback chain once. The commercial path never fails.
pub(crate) async fn run_chain(
    query: &LookupQuery,
    source: &ClientDataSource,
) -> Result<ClientRecord, ResolutionError> {
    match query.module() {
        Module::Commercial => Ok(resolve_commercial(query, source).await),
        Module::Other(_) => resolve_client(query, source).await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::{run_chain, unwrap_client_payload};
    use crate::error::{ResolutionError, SourceError};
    use crate::resolver::query::LookupQuery;
    use crate::resolver::source::ClientDataSource;

    #[test]
    fn unwrap_prefers_client_then_data_then_project() {
        let raw = json!({"client": {"id": 1}, "data": {"id": 2}, "project": {"id": 3}});
        assert_eq!(unwrap_client_payload(raw), json!({"id": 1}));

        let raw = json!({"data": {"id": 2}, "project": {"id": 3}});
        assert_eq!(unwrap_client_payload(raw), json!({"id": 2}));

        let raw = json!({"client": null, "project": {"id": 3}});
        assert_eq!(unwrap_client_payload(raw), json!({"id": 3}));

        let raw = json!({"name": "Acme"});
        assert_eq!(unwrap_client_payload(raw.clone()), raw);
    }

    #[tokio::test]
    async fn commercial_prefers_matter_number_as_key() {
        let source = ClientDataSource::new()
            .with_project_full_data(|key| async move { Ok(Some(json!({ "key": key }))) });
        let query = LookupQuery::new(Some("C-1"), Some("M-1"), "commercial");

        let record = run_chain(&query, &source).await.expect("commercial never fails");
        assert_eq!(record, json!({"key": "M-1"}));
    }

    #[tokio::test]
    async fn commercial_falls_back_to_stub_on_error_or_null() {
        let failing = ClientDataSource::new().with_project_full_data(|_| async move {
            Err(SourceError::Failed("backend down".to_string()))
        });
        let query = LookupQuery::new(Some("C-1"), None, "commercial");
        assert_eq!(
            run_chain(&query, &failing).await.expect("stub"),
            json!({"id": "C-1", "matterNumber": null})
        );

        let null_result = ClientDataSource::new()
            .with_project_full_data(|_| async move { Ok(Some(serde_json::Value::Null)) });
        let query = LookupQuery::new(None, Some("M-9"), "commercial");
        assert_eq!(
            run_chain(&query, &null_result).await.expect("stub"),
            json!({"id": null, "matterNumber": "M-9"})
        );

        let missing_method = ClientDataSource::new();
        assert!(run_chain(&query, &missing_method).await.is_ok());
    }

    #[tokio::test]
    async fn client_path_falls_through_to_matter_number() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = ClientDataSource::new().with_client_all_data(move |key| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                match key.as_str() {
                    "C-1" => Err(SourceError::Timeout),
                    "M-1" => Ok(Some(json!({"data": {"matter": "M-1"}}))),
                    _ => Ok(None),
                }
            }
        });
        let query = LookupQuery::new(Some("C-1"), Some("M-1"), "residential");

        let record = run_chain(&query, &source).await.expect("second strategy wins");
        assert_eq!(record, json!({"matter": "M-1"}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_path_stops_at_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = ClientDataSource::new().with_client_all_data(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(Some(json!({"client": {"name": "Acme"}, "data": {"name": "x"}}))) }
        });
        let query = LookupQuery::new(Some("C-1"), Some("M-1"), "residential");

        let record = run_chain(&query, &source).await.expect("found");
        assert_eq!(record, json!({"name": "Acme"}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn client_path_exhaustion_is_not_found() {
        let source = ClientDataSource::new().with_client_all_data(|_| async move { Ok(None) });
        let query = LookupQuery::new(Some("C-1"), Some("M-1"), "residential");

        let err = run_chain(&query, &source).await.expect_err("nothing found");
        assert!(matches!(err, ResolutionError::NotFound { .. }));
        assert!(err.to_string().contains("client_id=C-1"));
    }
}
