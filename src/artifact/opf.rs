//! OPF descriptor generation for matched items.
//!
//! Renders a catalog record into an OPF 2.0 `metadata.opf` document the way
//! library-management software expects it. Every record field is optional
//! except the title, so each descriptor element is produced by a total
//! mapping with a fixed placeholder: absent free-text fields render as
//! `Unknown`, absent links/derived values render as the empty string.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::catalog::VolumeRecord;

/// Fixed descriptor filename inside the item directory.
pub const DESCRIPTOR_FILENAME: &str = "metadata.opf";

/// Placeholder for absent free-text fields.
const UNKNOWN: &str = "Unknown";

/// Regex pattern for the first run of digits in a title (series index).
#[allow(clippy::expect_used)]
static DIGIT_RUN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+").expect("digit run regex is valid") // Static pattern, safe to panic
});

/// Errors produced by descriptor generation.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// I/O error writing the descriptor file to disk.
    #[error("I/O error writing descriptor: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `metadata.opf` for `record` into `item_dir`.
///
/// Any prior descriptor is overwritten unconditionally; re-runs converge on
/// identical content. Returns the path of the written file.
///
/// # Errors
///
/// Returns [`DescriptorError`] on I/O failure.
#[instrument(skip_all, fields(dir = %item_dir.display()))]
pub async fn write_descriptor(
    record: &VolumeRecord,
    item_dir: &Path,
) -> Result<PathBuf, DescriptorError> {
    let descriptor_path = item_dir.join(DESCRIPTOR_FILENAME);
    let document = render_descriptor(record);
    tokio::fs::write(&descriptor_path, document).await?;
    debug!(path = %descriptor_path.display(), "Descriptor written");
    Ok(descriptor_path)
}

/// Renders the full OPF document for a catalog record.
#[must_use]
pub fn render_descriptor(record: &VolumeRecord) -> String {
    let mut doc = String::new();
    doc.push_str("<?xml version='1.0' encoding='utf-8'?>\n");
    doc.push_str(
        "<package xmlns=\"http://www.idpf.org/2007/opf\" unique-identifier=\"uuid_id\" version=\"2.0\">\n",
    );
    doc.push_str(
        "  <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:opf=\"http://www.idpf.org/2007/opf\">\n",
    );

    push_dc(&mut doc, "title", &record.title);
    doc.push_str(&format!(
        "    <dc:creator opf:role=\"aut\">{}</dc:creator>\n",
        xml_escape(&authors_line(record))
    ));
    push_dc(
        &mut doc,
        "publisher",
        text_or_unknown(record.publisher.as_deref()),
    );
    push_dc(
        &mut doc,
        "date",
        text_or_unknown(record.published_date.as_deref()),
    );
    push_dc(
        &mut doc,
        "description",
        text_or_empty(record.description.as_deref()),
    );
    push_dc(
        &mut doc,
        "language",
        text_or_unknown(record.language.as_deref()),
    );
    doc.push_str(&format!(
        "    <dc:identifier opf:scheme=\"ISBN\">{}</dc:identifier>\n",
        xml_escape(isbn_13(record))
    ));
    push_dc(
        &mut doc,
        "type",
        text_or_unknown(record.print_type.as_deref()),
    );
    push_dc(
        &mut doc,
        "source",
        text_or_empty(record.canonical_volume_link.as_deref()),
    );

    if let Some(categories) = &record.categories {
        for category in categories {
            push_dc(&mut doc, "subject", category);
            for word in category.split_whitespace() {
                push_dc(&mut doc, "subject", word);
            }
        }
    }

    push_meta(
        &mut doc,
        "previewLink",
        text_or_empty(record.preview_link.as_deref()),
    );
    push_meta(
        &mut doc,
        "infoLink",
        text_or_empty(record.info_link.as_deref()),
    );
    push_meta(
        &mut doc,
        "maturityRating",
        text_or_unknown(record.maturity_rating.as_deref()),
    );
    push_meta(&mut doc, "calibre:series", derived_series(record));
    push_meta(
        &mut doc,
        "calibre:series_index",
        derived_series_index(&record.title),
    );
    push_meta(&mut doc, "calibre:rating", &rating_content(record));
    push_meta(&mut doc, "calibre:title_sort", &record.title);
    push_meta(&mut doc, "pageCount", &page_count_content(record));
    push_meta(
        &mut doc,
        "readingModes.text",
        flag_content(record.reading_modes.as_ref().and_then(|m| m.text)),
    );
    push_meta(
        &mut doc,
        "readingModes.image",
        flag_content(record.reading_modes.as_ref().and_then(|m| m.image)),
    );
    push_meta(
        &mut doc,
        "panelizationSummary.containsEpubBubbles",
        flag_content(
            record
                .panelization_summary
                .as_ref()
                .and_then(|p| p.contains_epub_bubbles),
        ),
    );
    push_meta(
        &mut doc,
        "panelizationSummary.containsImageBubbles",
        flag_content(
            record
                .panelization_summary
                .as_ref()
                .and_then(|p| p.contains_image_bubbles),
        ),
    );

    doc.push_str("  </metadata>\n");
    doc.push_str("  <manifest>\n");
    doc.push_str("    <item href=\"cover.jpg\" id=\"cover\" media-type=\"image/jpeg\"/>\n");
    doc.push_str("  </manifest>\n");
    doc.push_str("  <spine toc=\"ncx\"/>\n");
    doc.push_str("  <guide>\n");
    doc.push_str("    <reference href=\"cover.jpg\" title=\"Cover\" type=\"cover\"/>\n");
    doc.push_str("  </guide>\n");
    doc.push_str("</package>\n");
    doc
}

// ==================== Field Mappings ====================

fn push_dc(doc: &mut String, element: &str, value: &str) {
    doc.push_str(&format!(
        "    <dc:{element}>{}</dc:{element}>\n",
        xml_escape(value)
    ));
}

fn push_meta(doc: &mut String, name: &str, content: &str) {
    doc.push_str(&format!(
        "    <meta name=\"{name}\" content=\"{}\"/>\n",
        xml_escape(content)
    ));
}

fn text_or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

fn text_or_empty(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

fn authors_line(record: &VolumeRecord) -> String {
    record
        .authors
        .as_ref()
        .filter(|authors| !authors.is_empty())
        .map_or_else(|| UNKNOWN.to_string(), |authors| authors.join(", "))
}

/// First industry identifier of type `ISBN_13`, else the placeholder.
fn isbn_13(record: &VolumeRecord) -> &str {
    record
        .industry_identifiers
        .as_ref()
        .and_then(|ids| ids.iter().find(|id| id.kind == "ISBN_13"))
        .map_or(UNKNOWN, |id| id.identifier.as_str())
}

/// First category containing "tome" or "vol" (case-insensitive), else empty.
fn derived_series(record: &VolumeRecord) -> &str {
    record
        .categories
        .as_ref()
        .and_then(|categories| {
            categories.iter().find(|category| {
                let lower = category.to_lowercase();
                lower.contains("tome") || lower.contains("vol")
            })
        })
        .map_or("", String::as_str)
}

/// First run of digits anywhere in the title, else empty.
fn derived_series_index(title: &str) -> &str {
    DIGIT_RUN_PATTERN
        .find(title)
        .map_or("", |found| found.as_str())
}

fn rating_content(record: &VolumeRecord) -> String {
    record
        .average_rating
        .map_or_else(String::new, |rating| rating.to_string())
}

fn page_count_content(record: &VolumeRecord) -> String {
    record
        .page_count
        .map_or_else(String::new, |count| count.to_string())
}

fn flag_content(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "true",
        Some(false) => "false",
        None => "",
    }
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
