//! Per-key cache and in-flight table for client resolution.
//!
//! Timestamps use `tokio::time::Instant` so paused-clock tests can move
//! across the freshness and eviction windows.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::error::ResolutionError;
use crate::resolver::ClientRecord;
use crate::resolver::query::LookupQuery;

pub(crate) type SharedResolution =
    Shared<BoxFuture<'static, Result<ClientRecord, ResolutionError>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    record: ClientRecord,
    fetched_at: Instant,
    last_access: Instant,
}

struct InFlight {
    id: u64,
    future: SharedResolution,
}

#[derive(Default)]
pub(crate) struct ResolutionCache {
    entries: HashMap<LookupQuery, CacheEntry>,
    in_flight: HashMap<LookupQuery, InFlight>,
    last_errors: HashMap<LookupQuery, FailedLookup>,
}

#[derive(Debug, Clone)]
struct FailedLookup {
    error: ResolutionError,
    failed_at: Instant,
}

impl ResolutionCache {
    /// Drop entries nobody has touched within `gc_time`, and failures older
    /// than `gc_time`.
    pub(crate) fn sweep(&mut self, now: Instant, gc_time: Duration) -> usize {
        let before = self.entries.len() + self.last_errors.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_access) < gc_time);
        self.last_errors
            .retain(|_, failed| now.saturating_duration_since(failed.failed_at) < gc_time);
        let evicted = before - self.entries.len() - self.last_errors.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle client records");
        }
        evicted
    }

    /// Cached record still inside its freshness window. Marks the entry used.
    pub(crate) fn fresh(
        &mut self,
        query: &LookupQuery,
        now: Instant,
        stale_time: Duration,
    ) -> Option<ClientRecord> {
        let entry = self.entries.get_mut(query)?;
        entry.last_access = now;
        if now.saturating_duration_since(entry.fetched_at) < stale_time {
            Some(entry.record.clone())
        } else {
            None
        }
    }

    pub(crate) fn peek(&self, query: &LookupQuery) -> Option<&ClientRecord> {
        self.entries.get(query).map(|entry| &entry.record)
    }

    pub(crate) fn pending(&self, query: &LookupQuery) -> Option<SharedResolution> {
        self.in_flight.get(query).map(|flight| flight.future.clone())
    }

    pub(crate) fn is_pending(&self, query: &LookupQuery) -> bool {
        self.in_flight.contains_key(query)
    }

    pub(crate) fn begin(&mut self, query: LookupQuery, id: u64, future: SharedResolution) {
        self.in_flight.insert(query, InFlight { id, future });
    }

    /// Record the outcome of flight `id` and release its in-flight slot.
    pub(crate) fn finish(
        &mut self,
        query: &LookupQuery,
        id: u64,
        outcome: &Result<ClientRecord, ResolutionError>,
        now: Instant,
    ) {
        if self.in_flight.get(query).is_some_and(|flight| flight.id == id) {
            self.in_flight.remove(query);
        }

        match outcome {
            Ok(record) => {
                self.last_errors.remove(query);
                self.entries.insert(
                    query.clone(),
                    CacheEntry {
                        record: record.clone(),
                        fetched_at: now,
                        last_access: now,
                    },
                );
            }
            Err(err) => {
                self.last_errors.insert(
                    query.clone(),
                    FailedLookup {
                        error: err.clone(),
                        failed_at: now,
                    },
                );
            }
        }
    }

    pub(crate) fn last_error(&self, query: &LookupQuery) -> Option<&ResolutionError> {
        self.last_errors.get(query).map(|failed| &failed.error)
    }

    pub(crate) fn remove(&mut self, query: &LookupQuery) -> bool {
        self.last_errors.remove(query);
        self.entries.remove(query).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
