//! Final run summary printed to stdout.

use shelfsync_core::{REPORT_FILENAME, RunReport};

/// Render the end-of-run summary as plain aligned text.
///
/// Separated from printing so the layout is testable.
pub fn render_summary(report: &RunReport) -> String {
    let rows = [
        ("Books processed", report.processed),
        ("Matched on Google Books", report.matched),
        ("Unmatched", report.unmatched),
    ];
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut out = String::from("Reconciliation summary\n");
    for (label, value) in rows {
        out.push_str(&format!("  {label:<label_width$}  {value}\n"));
    }
    out.push_str(&format!(
        "Unmatched items recorded in {REPORT_FILENAME}\n"
    ));
    out
}

pub fn print_summary(report: &RunReport) {
    print!("{}", render_summary(report));
}
