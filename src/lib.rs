//! matterdesk: client record resolution and task-allocation report export
//! for the practice dashboard.
//!
//! - [`resolver`]: cached, deduplicated client lookups over an injected
//!   data-access capability
//! - [`report`]: snapshot-to-table report generation and artifact export

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod resolver;
pub mod settings;

pub use config::Config;
pub use error::{ConfigError, GenerationError, ResolutionError, SourceError};
pub use report::{Document, ReportGenerator};
pub use resolver::{ClientDataSource, ClientResolver, LookupQuery, QueryState};
