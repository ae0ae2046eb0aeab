//! Task-allocation report export.
//!
//! The generator reads the persisted client snapshot from a `SnapshotStore`,
//! optionally narrows it to one allocated user, projects every record into a
//! fixed eight-column row and renders the result as a titled table. The
//! rendered bytes go to an `ArtifactSink` under a dated artifact name.
//!
//! Failures never reach the dashboard: `export` logs them and returns a typed
//! error, and nothing is saved.

mod artifact;
mod record;
mod render;
mod stage;
mod store;

use chrono::{Local, NaiveDate};
use serde::Serialize;

pub use self::artifact::{
    ArtifactSink, DirectorySink, SavedArtifact, artifact_name, file_name_for,
};
pub use self::record::{OrderRecord, ReportRow, allocated_users, parse_snapshot};
pub use self::render::{render, render_csv, render_html};
pub use self::stage::{STAGE_KEYS, StageStatus, stage_progress, stage_statuses};
pub use self::store::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use crate::config::{ReportConfig, ReportFormat, ReportTheme};
use crate::error::{GenerationError, GenerationResult};

/// Placeholder for any value the source record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

pub const REPORT_HEADERS: [&str; 8] = [
    "Order ID",
    "Client Name",
    "Billing Address",
    "Order Date",
    "Delivery Date",
    "Order Details",
    "Stage Progress",
    "Allocated User",
];

/// A fully assembled report. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub title: String,
    pub rows: Vec<ReportRow>,
    pub footer: String,
    pub generated_on: NaiveDate,
    pub artifact_prefix: String,
    pub theme: ReportTheme,
}

impl Document {
    pub fn headers(&self) -> &'static [&'static str; 8] {
        &REPORT_HEADERS
    }

    pub fn footer_caption(&self) -> String {
        format!("{} on {}", self.footer, self.generated_on.format("%d/%m/%Y"))
    }

    pub fn artifact_name(&self, format: ReportFormat) -> String {
        artifact_name(&self.artifact_prefix, self.generated_on, format.extension())
    }
}

/// Blank or whitespace-only filters disable filtering; others match verbatim.
fn active_filter(allocated_filter: Option<&str>) -> Option<&str> {
    allocated_filter.filter(|filter| !filter.trim().is_empty())
}

/// Stage-progress text for a single record.
pub fn stage_summary(record: &OrderRecord) -> String {
    stage_progress(record.stages.as_ref())
}

pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Assemble a report from records already in memory.
    pub fn build(
        &self,
        records: &[OrderRecord],
        allocated_filter: Option<&str>,
        generated_on: NaiveDate,
    ) -> GenerationResult<Document> {
        let filter = active_filter(allocated_filter);
        let rows: Vec<ReportRow> = records
            .iter()
            .filter(|record| filter.is_none_or(|user| record.is_allocated_to(user)))
            .map(ReportRow::from)
            .collect();

        tracing::debug!(
            total = records.len(),
            rows = rows.len(),
            filter = filter.unwrap_or("-"),
            "Assembled task allocation report"
        );

        Ok(Document {
            title: self.config.title.clone(),
            rows,
            footer: self.config.footer.clone(),
            generated_on,
            artifact_prefix: self.config.artifact_prefix.clone(),
            theme: self.config.theme.clone(),
        })
    }

    /// Read the snapshot under the configured key.
    pub fn load_records(&self, store: &dyn SnapshotStore) -> GenerationResult<Vec<OrderRecord>> {
        let raw = store
            .get(&self.config.snapshot_key)
            .ok_or_else(|| GenerationError::NoData {
                reason: format!("no snapshot stored under '{}'", self.config.snapshot_key),
            })?;
        parse_snapshot(&raw)
    }

    /// Read the snapshot and build a report dated today (local time).
    pub fn generate(
        &self,
        store: &dyn SnapshotStore,
        allocated_filter: Option<&str>,
    ) -> GenerationResult<Document> {
        let records = self.load_records(store)?;
        self.build(&records, allocated_filter, Local::now().date_naive())
    }

    /// Generate, render and save a report. Errors are logged here and
    /// returned; no artifact is saved on failure.
    pub fn export(
        &self,
        store: &dyn SnapshotStore,
        allocated_filter: Option<&str>,
        sink: &dyn ArtifactSink,
    ) -> GenerationResult<SavedArtifact> {
        let outcome = self
            .generate(store, allocated_filter)
            .and_then(|document| self.save(&document, sink));

        match &outcome {
            Ok(saved) => {
                tracing::info!(name = %saved.name, path = ?saved.path, rows = saved.rows, "Report saved");
            }
            Err(GenerationError::NoData { reason }) => {
                tracing::warn!("Report export skipped: {}", reason);
            }
            Err(e) => {
                tracing::error!("Report export failed: {}", e);
            }
        }
        outcome
    }

    fn save(&self, document: &Document, sink: &dyn ArtifactSink) -> GenerationResult<SavedArtifact> {
        let bytes = render(document, self.config.format)?;
        let name = document.artifact_name(self.config.format);
        let path = sink.save(&name, &bytes).map_err(|e| {
            GenerationError::Unexpected(format!("failed to save '{}': {}", name, e))
        })?;
        Ok(SavedArtifact {
            name,
            path,
            rows: document.rows.len(),
        })
    }
}
