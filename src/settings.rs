//! User-editable settings, loaded from an optional TOML file.
//!
//! Settings carry raw values with defaults; `Config::resolve` layers
//! environment overrides on top and validates the result.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Seconds a resolved record is served from cache without refetching.
    pub stale_secs: u64,
    /// Seconds of inactivity after which a cached record is evicted.
    pub gc_secs: u64,
    /// Automatic retries after a failed resolution.
    pub retry: u32,
    pub retry_delay_ms: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            stale_secs: 5 * 60,
            gc_secs: 10 * 60,
            retry: 1,
            retry_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportThemeSettings {
    pub header_fill: String,
    pub header_text: String,
    pub alternate_row_fill: String,
    pub grid_line: String,
}

impl Default for ReportThemeSettings {
    fn default() -> Self {
        Self {
            header_fill: "#2980b9".to_string(),
            header_text: "#ffffff".to_string(),
            alternate_row_fill: "#f5f5f5".to_string(),
            grid_line: "#c8c8c8".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub snapshot_key: String,
    pub title: String,
    pub footer: String,
    pub artifact_prefix: String,
    pub format: String,
    pub output_dir: String,
    pub theme: ReportThemeSettings,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            snapshot_key: "client-storage".to_string(),
            title: "Task Allocation Report".to_string(),
            footer: "Generated from the client dashboard".to_string(),
            artifact_prefix: "TAR".to_string(),
            format: "html".to_string(),
            output_dir: "reports".to_string(),
            theme: ReportThemeSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverSettings,
    pub report: ReportSettings,
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(format!("invalid settings TOML: {}", e)))
    }

    /// Load settings from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file at {:?}; using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}
