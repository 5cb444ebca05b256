//! Catalog lookup: tiered Google Books resolution for local items.
//!
//! # Architecture
//!
//! - [`GoogleBooksClient`] - HTTP client issuing tiered volumes queries
//! - [`VolumeRecord`] - the catalog record consumed by the artifact writer
//! - [`Reconciliation`] - per-item lookup outcome (matched or unmatched)
//!
//! Lookup never fails loudly: transport errors, bad statuses, and malformed
//! bodies all collapse into "no record", and the run moves on.

mod client;
mod volume;

pub use client::GoogleBooksClient;
pub use volume::{
    ImageLinks, IndustryIdentifier, PanelizationSummary, ReadingModes, VolumeRecord,
};

/// Outcome of reconciling one local item against the catalog.
#[derive(Debug, Clone)]
pub enum Reconciliation {
    /// A catalog record was found; the first result of the winning tier.
    Matched(VolumeRecord),
    /// No record at either query tier.
    Unmatched,
}

impl Reconciliation {
    /// Returns `true` when a catalog record was found.
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}
