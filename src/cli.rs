//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use crate::config::{Config, ReportFormat};
use crate::error::GenerationError;
use crate::report::{DirectorySink, FileSnapshotStore, ReportGenerator, allocated_users};
use crate::resolver::{ClientDataSource, ClientResolver, FixtureLookup, LookupQuery};

#[derive(Debug, Parser)]
#[command(name = "matterdesk", version, about = "Client resolution and task allocation reports")]
pub struct Cli {
    /// Settings file (TOML). Missing files fall back to defaults.
    #[arg(long, global = true, env = "MATTERDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a client record against a JSON lookup fixture.
    Resolve {
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long)]
        matter_number: Option<String>,
        #[arg(long, default_value = "residential")]
        module: String,
        /// Fixture with `projects` and `clients` tables.
        #[arg(long)]
        fixture: PathBuf,
    },
    /// Export the task allocation report.
    Report {
        /// Directory holding `<snapshot_key>.json`.
        #[arg(long)]
        snapshot_dir: PathBuf,
        /// Only include rows allocated to this user (exact match).
        #[arg(long)]
        allocated: Option<String>,
        /// Override the configured format (html or csv).
        #[arg(long)]
        format: Option<String>,
        /// Override the configured output directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List allocated users present in the snapshot.
    Users {
        #[arg(long)]
        snapshot_dir: PathBuf,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Resolve {
            client_id,
            matter_number,
            module,
            fixture,
        } => {
            let lookup = FixtureLookup::from_path(&fixture)?;
            let resolver = ClientResolver::new(config.resolver)
                .with_source(ClientDataSource::from_lookup(Arc::new(lookup)));
            let query = LookupQuery::new(client_id.as_deref(), matter_number.as_deref(), &module);

            let record = resolver.resolve(&query).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Report {
            snapshot_dir,
            allocated,
            format,
            out,
        } => {
            if let Some(format) = format {
                config.report.format = ReportFormat::parse(&format)?;
            }
            let sink = DirectorySink::new(out.unwrap_or_else(|| config.report.output_dir.clone()));
            let generator = ReportGenerator::new(config.report);
            let store = FileSnapshotStore::new(snapshot_dir);

            match generator.export(&store, allocated.as_deref(), &sink) {
                Ok(saved) => println!(
                    "Saved {} ({} rows) to {}",
                    saved.name,
                    saved.rows,
                    saved.path.display()
                ),
                Err(GenerationError::NoData { .. }) => println!("No client data to report."),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Users { snapshot_dir } => {
            let generator = ReportGenerator::new(config.report);
            let store = FileSnapshotStore::new(snapshot_dir);
            match generator.load_records(&store) {
                Ok(records) => {
                    for user in allocated_users(&records) {
                        println!("{user}");
                    }
                }
                Err(GenerationError::NoData { reason }) => {
                    tracing::warn!("No client data: {}", reason);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
