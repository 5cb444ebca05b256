//! Unmatched-item report persistence.
//!
//! Items that miss both catalog tiers are collected during the run and
//! written out once at the end as a pretty-printed JSON array. The field
//! names are the historical French ones the downstream tooling already
//! consumes, so they are fixed through serde renames.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Fixed report filename, written to the working directory at end of run.
pub const REPORT_FILENAME: &str = "ebooks_not_found.json";

/// One unmatched item in the end-of-run report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnmatchedEntry {
    /// Author as extracted locally.
    #[serde(rename = "auteur")]
    pub author: String,
    /// Normalized title used for the failed lookup.
    #[serde(rename = "titre")]
    pub title: String,
    /// Local ISBN when one was extracted; serialized as `null` otherwise.
    #[serde(rename = "isbn")]
    pub isbn: Option<String>,
    /// Path of the e-book file the item was built from.
    #[serde(rename = "epub")]
    pub source_path: String,
}

/// Errors produced while persisting the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error writing the report file to disk.
    #[error("I/O error writing report: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error (shouldn't occur for well-formed entries).
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes the unmatched-item report to `report_path`, replacing any prior
/// report. An empty run still produces a file (an empty array) so consumers
/// can tell "clean run" from "never ran".
///
/// # Errors
///
/// Returns [`ReportError`] on I/O or serialization failure.
#[instrument(skip_all, fields(entries = entries.len(), path = %report_path.display()))]
pub fn write_unmatched_report(
    entries: &[UnmatchedEntry],
    report_path: &Path,
) -> Result<PathBuf, ReportError> {
    let file = fs::File::create(report_path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, entries)?;
    debug!("Unmatched report written");
    Ok(report_path.to_path_buf())
}
