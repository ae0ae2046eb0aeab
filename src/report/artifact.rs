//! Output artifacts: naming and where rendered reports end up.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// `"{prefix} - {DD/MM/YYYY}.{ext}"`
pub fn artifact_name(prefix: &str, date: NaiveDate, extension: &str) -> String {
    format!("{} - {}.{}", prefix, date.format("%d/%m/%Y"), extension)
}

/// Path separators in an artifact name are replaced so the date survives on disk.
pub fn file_name_for(artifact_name: &str) -> String {
    artifact_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}

/// Receiver of a finished report.
pub trait ArtifactSink {
    fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

/// A report handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes artifacts into a directory, all-or-nothing.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(file_name_for(name));
        let partial = target.with_extension("part");

        let result = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&partial)
            .and_then(|mut f| {
                f.write_all(bytes)?;
                f.sync_all()
            })
            .and_then(|()| std::fs::rename(&partial, &target));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        Ok(target)
    }
}
