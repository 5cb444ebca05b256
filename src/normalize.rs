//! Title normalization for catalog queries.
//!
//! Extracted titles carry noise the catalog chokes on: French volume markers
//! (`T1`, `T12`) and parenthetical edition notes. Both are stripped before a
//! title participates in a query or a folder rename.

use std::sync::LazyLock;

use regex::Regex;

/// Regex pattern for standalone volume markers: `T` followed by digits,
/// bounded on both sides (`Saga T3` matches, `T3000` inside a word does not).
#[allow(clippy::expect_used)]
static VOLUME_MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bT\d+\b").expect("volume marker regex is valid") // Static pattern, safe to panic
});

/// Regex pattern for parenthetical segments, non-greedy so multiple groups
/// are removed independently.
#[allow(clippy::expect_used)]
static PARENTHETICAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(.*?\)").expect("parenthetical regex is valid") // Static pattern, safe to panic
});

/// Normalizes a raw extracted title for catalog lookup.
///
/// Removes volume markers first, then parenthetical segments, then trims
/// surrounding whitespace. Interior whitespace is left untouched so the
/// title still reads naturally in queries and reports.
#[must_use]
pub fn clean_title(raw_title: &str) -> String {
    let without_markers = VOLUME_MARKER_PATTERN.replace_all(raw_title, "");
    let without_parentheticals = PARENTHETICAL_PATTERN.replace_all(&without_markers, "");
    without_parentheticals.trim().to_string()
}
