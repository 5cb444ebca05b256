//! Library walk and per-item reconciliation pipeline.
//!
//! The [`ReconcileEngine`] drives one full pass: walk the scan root for
//! e-book files, extract local metadata for each, normalize the title, look
//! the item up in the catalog, and apply matched records to disk. Items are
//! handled strictly one at a time so each directory is touched by exactly
//! one rename/descriptor/cover sequence.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::artifact::ArtifactWriter;
use crate::catalog::{GoogleBooksClient, Reconciliation};
use crate::extract::{EbookMetaExtractor, LocalMetadata, MetadataExtractor};
use crate::normalize::clean_title;
use crate::report::UnmatchedEntry;

/// Recognized e-book extension (matched case-insensitively).
const EBOOK_EXTENSION: &str = "epub";

/// Aggregated statistics for one reconciliation pass.
///
/// `processed` counts items that reached the catalog; extraction skips are
/// deliberately not counted, matching the historical report semantics.
/// `matched + unmatched == processed` always holds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Items that produced usable local metadata and were looked up.
    pub processed: usize,
    /// Items matched to a catalog record (artifacts applied).
    pub matched: usize,
    /// Items with no record at either catalog tier.
    pub unmatched: usize,
    /// Report entries for the unmatched items, in processing order.
    pub unmatched_items: Vec<UnmatchedEntry>,
}

impl RunReport {
    fn record_matched(&mut self) {
        self.processed += 1;
        self.matched += 1;
    }

    fn record_unmatched(&mut self, entry: UnmatchedEntry) {
        self.processed += 1;
        self.unmatched += 1;
        self.unmatched_items.push(entry);
    }
}

/// Collects every e-book file under `root`, recursively, in sorted order.
///
/// Unreadable directory entries are logged and skipped; a missing root
/// yields an empty list rather than an error, so an empty library and an
/// absent one report the same way.
#[must_use]
pub fn collect_ebook_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                let is_ebook = entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(EBOOK_EXTENSION));
                if is_ebook {
                    files.push(entry.into_path());
                }
            }
            Ok(_) => {}
            Err(error) => {
                warn!(error = %error, "skipping unreadable entry during walk");
            }
        }
    }
    files.sort();
    files
}

/// Drives the full reconciliation pipeline over a scan root.
pub struct ReconcileEngine {
    extractor: Box<dyn MetadataExtractor>,
    catalog: GoogleBooksClient,
    writer: ArtifactWriter,
}

impl Default for ReconcileEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconcileEngine {
    /// Creates an engine with the production components: `ebook-meta`
    /// extraction, the public Google Books API, and a live artifact writer.
    ///
    /// # Panics
    ///
    /// Panics if HTTP client construction fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_components(
            Box::new(EbookMetaExtractor::new()),
            GoogleBooksClient::new(),
            ArtifactWriter::new(),
        )
    }

    /// Creates an engine from explicit components (used by tests to stub
    /// the extractor and point the catalog at a mock server).
    #[must_use]
    pub fn with_components(
        extractor: Box<dyn MetadataExtractor>,
        catalog: GoogleBooksClient,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            extractor,
            catalog,
            writer,
        }
    }

    /// Runs one full pass over `root` and returns the aggregated report.
    ///
    /// `show_progress` renders a per-item progress bar on stderr; pass
    /// `false` for quiet runs and tests. Per-item failures are logged and
    /// never abort the pass.
    pub async fn run(&self, root: &Path, show_progress: bool) -> RunReport {
        let files = collect_ebook_files(root);
        info!(
            items = files.len(),
            root = %root.display(),
            "starting reconciliation pass"
        );

        let progress = if show_progress {
            let bar = ProgressBar::new(u64::try_from(files.len()).unwrap_or(u64::MAX));
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut report = RunReport::default();
        for epub_path in &files {
            if let Some(name) = epub_path.file_name().and_then(|n| n.to_str()) {
                progress.set_message(name.to_string());
            }
            self.process_item(epub_path, &mut report).await;
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            processed = report.processed,
            matched = report.matched,
            unmatched = report.unmatched,
            "reconciliation pass complete"
        );
        report
    }

    /// Processes one e-book file through extract → normalize → resolve →
    /// apply, updating `report` with the outcome.
    #[instrument(skip_all, fields(path = %epub_path.display()))]
    async fn process_item(&self, epub_path: &Path, report: &mut RunReport) {
        let raw = match self.extractor.extract(epub_path).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                debug!("incomplete local metadata, skipping item");
                return;
            }
            Err(error) => {
                warn!(error = %error, "metadata extraction failed, skipping item");
                return;
            }
        };

        let title = clean_title(&raw.title);
        if title.is_empty() {
            debug!(raw_title = %raw.title, "title empty after normalization, skipping item");
            return;
        }
        let item = LocalMetadata { title, ..raw };

        match self.catalog.resolve(&item).await {
            Reconciliation::Matched(record) => {
                debug!(matched_title = %record.title, "catalog match found");
                if let Some(item_dir) = epub_path.parent() {
                    self.writer.apply(&record, item_dir).await;
                } else {
                    warn!("item has no parent directory, skipping artifact write");
                }
                report.record_matched();
            }
            Reconciliation::Unmatched => {
                debug!("no catalog record at either tier");
                report.record_unmatched(UnmatchedEntry {
                    author: item.author,
                    title: item.title,
                    isbn: item.isbn,
                    source_path: epub_path.display().to_string(),
                });
            }
        }
    }
}

impl std::fmt::Debug for ReconcileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileEngine")
            .field("catalog", &self.catalog)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}
