//! Read-only snapshot stores the report generator pulls client data from.

use std::collections::HashMap;
use std::path::PathBuf;

/// Key-value store holding JSON-serialized application state.
pub trait SnapshotStore {
    /// Raw value for `key`, or `None` when the key is absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
}

/// In-process store, populated by whoever owns the dashboard state.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: HashMap<String, String>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Directory of `<key>.json` files.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    root: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        safe.then(|| self.root.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn get(&self, key: &str) -> Option<String> {
        let Some(path) = self.path_for(key) else {
            tracing::warn!(key, "Rejecting snapshot key with unsupported characters");
            return None;
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read snapshot {:?}: {}", path, e);
                None
            }
        }
    }
}
