//! Google Books volumes API response types.

use serde::Deserialize;

// ==================== Volumes API Response Types ====================

/// Top-level response from the volumes search endpoint.
///
/// The `items` array is omitted entirely when a query matches nothing, so
/// every layer above treats `None` and an empty array the same way.
#[derive(Debug, Deserialize)]
pub(crate) struct VolumesResponse {
    #[allow(dead_code)] // Deserialized for completeness; useful when tracing raw responses
    #[serde(rename = "totalItems")]
    pub total_items: Option<u64>,
    pub items: Option<Vec<VolumeItem>>,
}

/// One entry of the `items` array.
#[derive(Debug, Deserialize)]
pub(crate) struct VolumeItem {
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeRecord,
}

/// The `volumeInfo` block of a volume entry - the catalog record the rest of
/// the pipeline consumes.
///
/// Every field except `title` is optional in practice; the descriptor writer
/// maps each absent field to a documented placeholder instead of failing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRecord {
    /// Canonical catalog title, also the source for the folder rename.
    #[serde(default)]
    pub title: String,
    pub authors: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub industry_identifiers: Option<Vec<IndustryIdentifier>>,
    pub reading_modes: Option<ReadingModes>,
    pub page_count: Option<u32>,
    pub print_type: Option<String>,
    pub categories: Option<Vec<String>>,
    pub average_rating: Option<f64>,
    pub maturity_rating: Option<String>,
    pub panelization_summary: Option<PanelizationSummary>,
    pub image_links: Option<ImageLinks>,
    pub language: Option<String>,
    pub preview_link: Option<String>,
    pub info_link: Option<String>,
    pub canonical_volume_link: Option<String>,
}

/// An industry identifier entry, e.g. `{"type": "ISBN_13", "identifier": "..."}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IndustryIdentifier {
    /// Identifier scheme (`ISBN_10`, `ISBN_13`, `OTHER`).
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

/// Reading mode availability flags.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct ReadingModes {
    pub text: Option<bool>,
    pub image: Option<bool>,
}

/// Comic panelization flags, present mostly on graphic novels.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PanelizationSummary {
    pub contains_epub_bubbles: Option<bool>,
    pub contains_image_bubbles: Option<bool>,
}

/// Cover image links.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    #[allow(dead_code)] // Deserialized for completeness; cover download uses `thumbnail`
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}
