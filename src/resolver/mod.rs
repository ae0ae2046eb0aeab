//! Client record resolution.
//!
//! `ClientResolver` turns a `(client_id, matter_number, module)` tuple into a
//! client record by walking an ordered chain of lookups against an injected
//! `ClientDataSource`:
//!
//! - commercial module: full project data by matter number (or client id),
//!   falling back to a stub `{id, matterNumber}` record; never fails
//! - every other module: client data by client id, then by matter number,
//!   unwrapping the first of `client`, `data`, `project`; fails with
//!   `NotFound` when both come back empty
//!
//! Results are cached per tuple for a freshness window and evicted after an
//! idle window. Concurrent resolutions of one tuple share a single fetch.

mod cache;
mod chain;
mod query;
mod source;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::time::Instant;

pub use self::query::{LookupQuery, Module};
pub use self::source::{ClientDataSource, ClientLookup, FixtureLookup, LookupFn, LookupFuture};
use self::cache::{ResolutionCache, SharedResolution};
use crate::config::ResolverConfig;
use crate::error::ResolutionError;

/// Client records are opaque JSON bags forwarded as-is.
pub type ClientRecord = serde_json::Value;

/// Resolution state of one lookup tuple, for UI consumption.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// No data source or no identifier; the lookup will not run.
    Disabled,
    /// Never resolved, or evicted.
    Idle,
    Loading,
    Success(ClientRecord),
    Error(ResolutionError),
}

pub struct ClientResolver {
    config: ResolverConfig,
    source: Option<Arc<ClientDataSource>>,
    cache: Arc<Mutex<ResolutionCache>>,
    next_flight: AtomicU64,
}

fn lock(cache: &Mutex<ResolutionCache>) -> MutexGuard<'_, ResolutionCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the chain, re-running it up to `retry_attempts` times after a failure.
async fn fetch_with_retry(
    query: &LookupQuery,
    source: &ClientDataSource,
    config: &ResolverConfig,
) -> Result<ClientRecord, ResolutionError> {
    let mut retries = 0;
    loop {
        match chain::run_chain(query, source).await {
            Ok(record) => return Ok(record),
            Err(err) if retries < config.retry_attempts => {
                retries += 1;
                tracing::warn!(
                    query = %query,
                    error = %err,
                    retry = retries,
                    "Client resolution failed; retrying"
                );
                tokio::time::sleep(config.retry_delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

impl ClientResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            source: None,
            cache: Arc::new(Mutex::new(ResolutionCache::default())),
            next_flight: AtomicU64::new(1),
        }
    }

    pub fn with_source(mut self, source: ClientDataSource) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether `resolve` would run for this query.
    pub fn is_enabled(&self, query: &LookupQuery) -> bool {
        self.gate(query).is_ok()
    }

    fn gate(&self, query: &LookupQuery) -> Result<Arc<ClientDataSource>, ResolutionError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| ResolutionError::SourceUnavailable {
                reason: "no client data source configured".to_string(),
            })?;
        if !query.has_identifier() {
            return Err(ResolutionError::SourceUnavailable {
                reason: "a client id or matter number is required".to_string(),
            });
        }
        Ok(Arc::clone(source))
    }

    /// Resolve a client record, serving it from cache when fresh.
    pub async fn resolve(&self, query: &LookupQuery) -> Result<ClientRecord, ResolutionError> {
        let source = self.gate(query)?;

        let pending = {
            let mut cache = lock(&self.cache);
            let now = Instant::now();
            cache.sweep(now, self.config.gc_time);

            if let Some(record) = cache.fresh(query, now, self.config.stale_time) {
                tracing::debug!(query = %query, "Client record served from cache");
                return Ok(record);
            }

            match cache.pending(query) {
                Some(flight) => {
                    tracing::debug!(query = %query, "Joining in-flight client resolution");
                    flight
                }
                None => {
                    let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                    let flight = self.start_flight(query.clone(), source, id);
                    cache.begin(query.clone(), id, flight.clone());
                    flight
                }
            }
        };

        pending.await
    }

    fn start_flight(
        &self,
        query: LookupQuery,
        source: Arc<ClientDataSource>,
        id: u64,
    ) -> SharedResolution {
        let cache = Arc::clone(&self.cache);
        let config = self.config.clone();
        let task_query = query.clone();
        let task_cache = Arc::clone(&cache);
        // Spawned so the fetch completes even if every waiter is dropped.
        let task = tokio::spawn(async move {
            tracing::debug!(query = %task_query, "Fetching client record");
            let outcome = fetch_with_retry(&task_query, &source, &config).await;
            lock(&task_cache).finish(&task_query, id, &outcome, Instant::now());
            outcome
        });
        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(query = %query, "Client resolution task failed: {}", err);
                    let outcome = Err(ResolutionError::SourceUnavailable {
                        reason: format!("client resolution task failed: {}", err),
                    });
                    lock(&cache).finish(&query, id, &outcome, Instant::now());
                    outcome
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Current state of a lookup tuple without triggering a fetch.
    pub fn state(&self, query: &LookupQuery) -> QueryState {
        if !self.is_enabled(query) {
            return QueryState::Disabled;
        }
        let cache = lock(&self.cache);
        if cache.is_pending(query) {
            return QueryState::Loading;
        }
        if let Some(record) = cache.peek(query) {
            return QueryState::Success(record.clone());
        }
        match cache.last_error(query) {
            Some(err) => QueryState::Error(err.clone()),
            None => QueryState::Idle,
        }
    }

    /// Cached record for a tuple, fresh or stale.
    pub fn cached(&self, query: &LookupQuery) -> Option<ClientRecord> {
        lock(&self.cache).peek(query).cloned()
    }

    /// Drop the cached record for a tuple so the next resolve refetches.
    pub fn invalidate(&self, query: &LookupQuery) -> bool {
        lock(&self.cache).remove(query)
    }

    /// Evict every record idle for longer than the eviction window, along with
    /// failures older than it.
    pub fn purge_expired(&self) -> usize {
        lock(&self.cache).sweep(Instant::now(), self.config.gc_time)
    }

    pub fn cached_len(&self) -> usize {
        lock(&self.cache).len()
    }
}
