//! ShelfSync Core Library
//!
//! This library provides the core functionality for the shelfsync tool,
//! which reconciles a local e-book library against the Google Books catalog
//! and normalizes item folders into a consistent, metadata-rich layout.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`artifact`] - Folder renames, OPF descriptors, cover downloads
//! - [`catalog`] - Google Books volume search and reconciliation
//! - [`extract`] - Local metadata extraction via the `ebook-meta` tool
//! - [`normalize`] - Title cleanup before catalog lookup
//! - [`report`] - Unmatched-item report persistence
//! - [`scan`] - Library walk and the reconciliation engine

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod catalog;
pub mod extract;
pub mod normalize;
pub mod report;
pub mod scan;

mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use artifact::{ApplyOutcome, ArtifactWriter};
pub use catalog::{GoogleBooksClient, Reconciliation, VolumeRecord};
pub use extract::{EbookMetaExtractor, ExtractError, LocalMetadata, MetadataExtractor};
pub use normalize::clean_title;
pub use report::{REPORT_FILENAME, UnmatchedEntry, write_unmatched_report};
pub use scan::{ReconcileEngine, RunReport, collect_ebook_files};
