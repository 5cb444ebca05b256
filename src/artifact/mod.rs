//! Sidecar artifact writing for matched items.
//!
//! Applying a match touches on-disk state three ways, in order: the item
//! folder is renamed to the sanitized catalog title, `metadata.opf` is
//! written inside it, and `cover.jpg` is downloaded when the record carries
//! a thumbnail link. Steps are not transactional - a failed step is logged
//! and the remaining steps still run against the current directory.
//!
//! # Architecture
//!
//! - [`ArtifactWriter`] - per-run entry point driving the three steps
//! - [`sanitize_folder_name`] / rename - collision-safe folder naming
//! - [`write_descriptor`] - OPF 2.0 document generation
//! - [`CoverDownloader`] - streaming `cover.jpg` fetch

mod cover;
mod folder;
mod opf;

pub use cover::{COVER_FILENAME, CoverDownloader, CoverError};
pub use folder::sanitize_folder_name;
pub use opf::{DESCRIPTOR_FILENAME, DescriptorError, render_descriptor, write_descriptor};

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::catalog::VolumeRecord;

/// Outcome of the rename step of one apply pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Directory renamed; artifacts were written under the new path.
    RenamedTo(PathBuf),
    /// Rename skipped (collision, empty target, or refused); original path kept.
    Skipped,
}

/// Applies matched catalog records to item directories.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    covers: CoverDownloader,
}

impl Default for ArtifactWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactWriter {
    /// Creates a writer with a fresh cover-download client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self {
            covers: CoverDownloader::new(),
        }
    }

    /// Applies `record` to the item living in `item_dir`.
    ///
    /// Rename first, then descriptor, then cover, each against whatever
    /// directory the rename step settled on. Descriptor and cover failures
    /// are logged and swallowed; the returned outcome describes only the
    /// rename step.
    #[instrument(skip_all, fields(dir = %item_dir.display(), title = %record.title))]
    pub async fn apply(&self, record: &VolumeRecord, item_dir: &Path) -> ApplyOutcome {
        let outcome = folder::rename_to_title(item_dir, &record.title).await;
        let target_dir = match &outcome {
            ApplyOutcome::RenamedTo(renamed) => renamed.clone(),
            ApplyOutcome::Skipped => item_dir.to_path_buf(),
        };

        if let Err(error) = opf::write_descriptor(record, &target_dir).await {
            warn!(
                error = %error,
                dir = %target_dir.display(),
                "descriptor write failed, continuing with next step"
            );
        }

        match record
            .image_links
            .as_ref()
            .and_then(|links| links.thumbnail.as_deref())
        {
            Some(thumbnail_url) => {
                if let Err(error) = self.covers.download(thumbnail_url, &target_dir).await {
                    warn!(
                        error = %error,
                        dir = %target_dir.display(),
                        "cover download failed, continuing"
                    );
                }
            }
            None => debug!("record has no thumbnail link, skipping cover"),
        }

        outcome
    }
}
