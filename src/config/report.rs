use std::path::{Component, PathBuf};

use serde::Serialize;

use crate::config::helpers::parse_string_env;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Output encoding for an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
}

impl ReportFormat {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "csv" => Ok(Self::Csv),
            other => Err(ConfigError::InvalidValue {
                key: "REPORT_FORMAT".to_string(),
                message: format!("unsupported format '{other}'"),
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Csv => "csv",
        }
    }
}

/// Table colours for the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTheme {
    pub header_fill: String,
    pub header_text: String,
    pub alternate_row_fill: String,
    pub grid_line: String,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ReportTheme {
    fn from_settings(settings: &Settings) -> Self {
        let theme = &settings.report.theme;
        Self {
            header_fill: theme.header_fill.clone(),
            header_text: theme.header_text.clone(),
            alternate_row_fill: theme.alternate_row_fill.clone(),
            grid_line: theme.grid_line.clone(),
        }
    }
}

/// Report export configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Key of the persisted client snapshot in the snapshot store.
    pub snapshot_key: String,
    pub title: String,
    pub footer: String,
    pub artifact_prefix: String,
    pub format: ReportFormat,
    pub output_dir: PathBuf,
    pub theme: ReportTheme,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            snapshot_key: settings.report.snapshot_key.clone(),
            title: settings.report.title.clone(),
            footer: settings.report.footer.clone(),
            artifact_prefix: settings.report.artifact_prefix.clone(),
            format: ReportFormat::Html,
            output_dir: PathBuf::from(&settings.report.output_dir),
            theme: ReportTheme::from_settings(&settings),
        }
    }
}

fn validate_non_empty(key: &str, raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_output_dir(raw: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "REPORT_OUTPUT_DIR".to_string(),
            message: "output directory must not be empty".to_string(),
        });
    }

    let raw_path = PathBuf::from(trimmed);
    if raw_path.is_absolute() {
        return Ok(raw_path);
    }

    let mut normalized = PathBuf::new();
    for component in raw_path.components() {
        match component {
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(ConfigError::InvalidValue {
                    key: "REPORT_OUTPUT_DIR".to_string(),
                    message: "relative output directory must not contain '..' components"
                        .to_string(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if normalized.as_os_str().is_empty() {
        return Ok(PathBuf::from("."));
    }
    Ok(normalized)
}

impl ReportConfig {
    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let format_raw = parse_string_env("REPORT_FORMAT", settings.report.format.clone())?;
        let output_raw = parse_string_env("REPORT_OUTPUT_DIR", settings.report.output_dir.clone())?;

        Ok(Self {
            snapshot_key: validate_non_empty(
                "REPORT_SNAPSHOT_KEY",
                parse_string_env("REPORT_SNAPSHOT_KEY", settings.report.snapshot_key.clone())?,
            )?,
            title: parse_string_env("REPORT_TITLE", settings.report.title.clone())?,
            footer: settings.report.footer.clone(),
            artifact_prefix: validate_non_empty(
                "REPORT_PREFIX",
                parse_string_env("REPORT_PREFIX", settings.report.artifact_prefix.clone())?,
            )?,
            format: ReportFormat::parse(&format_raw)?,
            output_dir: validate_output_dir(&output_raw)?,
            theme: ReportTheme::from_settings(settings),
        })
    }
}
