//! Local metadata extraction for e-book files.
//!
//! Raw title, author, and ISBN come from the `ebook-meta` command-line tool
//! (shipped with Calibre). Its line-oriented output is the only contract this
//! module depends on; the tool itself is replaceable through the
//! [`MetadataExtractor`] trait so the reconciliation pipeline can be driven
//! by stubs in tests.

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// External tool used for local metadata extraction (part of Calibre).
pub const DEFAULT_EXTRACTION_TOOL: &str = "ebook-meta";

/// Regex pattern for ISBN entries on the `Identifiers` output line,
/// e.g. `isbn:9781607066019`.
#[allow(clippy::expect_used)]
static ISBN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"isbn:(\d+)").expect("ISBN regex is valid") // Static pattern, safe to panic
});

/// Raw bibliographic metadata for one local e-book item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMetadata {
    /// Title as reported by the extraction tool (not yet normalized).
    pub title: String,
    /// Author line as reported by the extraction tool.
    pub author: String,
    /// First ISBN found among the tool's identifiers, if any.
    pub isbn: Option<String>,
}

/// Errors that can occur while running the extraction tool.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The tool could not be spawned at all (missing binary, permissions).
    #[error("failed to run {tool} for {path}: {source}")]
    Spawn {
        /// Program that was invoked
        tool: String,
        /// E-book file the tool was pointed at
        path: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited with a failure status.
    #[error("{tool} reported {status} for {path}")]
    ToolFailure {
        /// Program that was invoked
        tool: String,
        /// Exit status reported by the tool
        status: std::process::ExitStatus,
        /// E-book file the tool was pointed at
        path: String,
    },
}

impl ExtractError {
    /// Creates a `Spawn` error for a tool that could not be started.
    #[must_use]
    pub fn spawn_failure(tool: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Spawn {
            tool: tool.to_string(),
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates a `ToolFailure` error for a non-success exit status.
    #[must_use]
    pub fn tool_failure(tool: &str, path: &Path, status: std::process::ExitStatus) -> Self {
        Self::ToolFailure {
            tool: tool.to_string(),
            status,
            path: path.display().to_string(),
        }
    }
}

/// Trait for components that read bibliographic metadata from a local file.
///
/// # Contract
///
/// - `Ok(Some(metadata))` - the tool ran and produced at least a title and
///   an author.
/// - `Ok(None)` - the tool ran cleanly but title or author is missing; the
///   item cannot be reconciled and should be skipped.
/// - `Err(_)` - the tool could not be run or exited with a failure status.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn MetadataExtractor>`. Rust 2024 native async traits are not
/// object-safe, so `async_trait` is required for the engine to swap
/// implementations.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extracts raw metadata from the e-book file at `epub_path`.
    async fn extract(&self, epub_path: &Path) -> Result<Option<LocalMetadata>, ExtractError>;
}

/// [`MetadataExtractor`] backed by Calibre's `ebook-meta` tool.
#[derive(Debug, Clone)]
pub struct EbookMetaExtractor {
    program: String,
}

impl EbookMetaExtractor {
    /// Creates an extractor that invokes `ebook-meta` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program(DEFAULT_EXTRACTION_TOOL)
    }

    /// Creates an extractor that invokes a custom program (used in tests).
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for EbookMetaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataExtractor for EbookMetaExtractor {
    async fn extract(&self, epub_path: &Path) -> Result<Option<LocalMetadata>, ExtractError> {
        let output = Command::new(&self.program)
            .arg(epub_path)
            .output()
            .await
            .map_err(|source| ExtractError::spawn_failure(&self.program, epub_path, source))?;

        if !output.status.success() {
            return Err(ExtractError::tool_failure(
                &self.program,
                epub_path,
                output.status,
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = parse_tool_output(&stdout);
        if parsed.is_none() {
            debug!(
                path = %epub_path.display(),
                "tool output missing title or author"
            );
        }
        Ok(parsed)
    }
}

/// Parses the line-oriented output of the extraction tool.
///
/// Lines prefixed `Title`, `Author`, and `Identifiers` are recognized; the
/// value is everything after the first `:`, trimmed. Later matching lines
/// overwrite earlier ones. Returns `None` unless both title and author end
/// up non-empty.
fn parse_tool_output(stdout: &str) -> Option<LocalMetadata> {
    let mut title: Option<String> = None;
    let mut author: Option<String> = None;
    let mut isbn: Option<String> = None;

    for line in stdout.lines() {
        if line.starts_with("Title") {
            title = value_after_colon(line);
        } else if line.starts_with("Author") {
            author = value_after_colon(line);
        } else if line.starts_with("Identifiers") {
            if let Some(found) = ISBN_PATTERN.captures(line).and_then(|c| c.get(1)) {
                isbn = Some(found.as_str().to_string());
            }
        }
    }

    let title = title.filter(|t| !t.is_empty())?;
    let author = author.filter(|a| !a.is_empty())?;
    Some(LocalMetadata {
        title,
        author,
        isbn,
    })
}

fn value_after_colon(line: &str) -> Option<String> {
    line.split_once(':').map(|(_, value)| value.trim().to_string())
}
