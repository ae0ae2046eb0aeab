//! Configuration for matterdesk.
//!
//! Values come from `Settings` (defaults plus an optional TOML file) and are
//! overridden by environment variables. A `.env` file in the working
//! directory is loaded first via `dotenvy`.

pub(crate) mod helpers;
mod report;
mod resolver;

use std::path::Path;

pub use self::report::{ReportConfig, ReportFormat, ReportTheme};
pub use self::resolver::ResolverConfig;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Resolve configuration from settings and the environment.
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            resolver: ResolverConfig::resolve(settings)?,
            report: ReportConfig::resolve(settings)?,
        })
    }

    /// Load `.env`, read the settings file (if any) and resolve.
    pub fn load(settings_path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let settings = match settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Self::resolve(&settings)
    }
}
