//! Injected data-access capability for client resolution.
//!
//! A `ClientDataSource` carries up to two lookup methods. Either may be
//! missing; a missing method behaves exactly like one that returned no
//! record, so callers never need to probe the backend's shape.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SourceError;

pub type LookupFuture = BoxFuture<'static, Result<Option<Value>, SourceError>>;

/// A single lookup method: key in, optional record out.
pub type LookupFn = Arc<dyn Fn(String) -> LookupFuture + Send + Sync>;

/// Capability struct handed to `ClientResolver`.
#[derive(Clone, Default)]
pub struct ClientDataSource {
    project_full_data: Option<LookupFn>,
    client_all_data: Option<LookupFn>,
}

impl fmt::Debug for ClientDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientDataSource")
            .field("project_full_data", &self.project_full_data.is_some())
            .field("client_all_data", &self.client_all_data.is_some())
            .finish()
    }
}

impl ClientDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the full-project lookup used by the commercial module.
    pub fn with_project_full_data<F, Fut>(mut self, lookup: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, SourceError>> + Send + 'static,
    {
        self.project_full_data = Some(Arc::new(move |key| lookup(key).boxed()));
        self
    }

    /// Attach the client lookup used by every other module.
    pub fn with_client_all_data<F, Fut>(mut self, lookup: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, SourceError>> + Send + 'static,
    {
        self.client_all_data = Some(Arc::new(move |key| lookup(key).boxed()));
        self
    }

    /// Expose a `ClientLookup` backend through both capability slots.
    pub fn from_lookup(lookup: Arc<dyn ClientLookup>) -> Self {
        let projects = Arc::clone(&lookup);
        let clients = lookup;
        Self::new()
            .with_project_full_data(move |key| {
                let lookup = Arc::clone(&projects);
                async move { lookup.project_full_data(&key).await }
            })
            .with_client_all_data(move |key| {
                let lookup = Arc::clone(&clients);
                async move { lookup.client_all_data(&key).await }
            })
    }

    pub fn has_project_full_data(&self) -> bool {
        self.project_full_data.is_some()
    }

    pub fn has_client_all_data(&self) -> bool {
        self.client_all_data.is_some()
    }

    pub(crate) async fn project_full_data(&self, key: &str) -> Result<Option<Value>, SourceError> {
        match &self.project_full_data {
            Some(lookup) => lookup(key.to_string()).await,
            None => Ok(None),
        }
    }

    pub(crate) async fn client_all_data(&self, key: &str) -> Result<Option<Value>, SourceError> {
        match &self.client_all_data {
            Some(lookup) => lookup(key.to_string()).await,
            None => Ok(None),
        }
    }
}

/// Backend-side view of the data-access capability.
///
/// Both methods default to "no record", so a backend only implements the
/// lookups it actually supports.
#[async_trait]
pub trait ClientLookup: Send + Sync {
    async fn project_full_data(&self, _key: &str) -> Result<Option<Value>, SourceError> {
        Ok(None)
    }

    async fn client_all_data(&self, _key: &str) -> Result<Option<Value>, SourceError> {
        Ok(None)
    }
}

/// Lookup backend over a static JSON fixture.
///
/// ```json
/// { "projects": { "M-100": { ... } }, "clients": { "C-7": { "client": { ... } } } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureLookup {
    #[serde(default)]
    projects: HashMap<String, Value>,
    #[serde(default)]
    clients: HashMap<String, Value>,
}

impl FixtureLookup {
    pub fn from_json_str(raw: &str) -> Result<Self, SourceError> {
        serde_json::from_str(raw)
            .map_err(|e| SourceError::Failed(format!("invalid lookup fixture: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SourceError::Failed(format!("failed to read lookup fixture {:?}: {}", path, e))
        })?;
        Self::from_json_str(&raw)
    }
}

#[async_trait]
impl ClientLookup for FixtureLookup {
    async fn project_full_data(&self, key: &str) -> Result<Option<Value>, SourceError> {
        Ok(self.projects.get(key).cloned())
    }

    async fn client_all_data(&self, key: &str) -> Result<Option<Value>, SourceError> {
        Ok(self.clients.get(key).cloned())
    }
}
