//! CLI entry point for the shelfsync tool.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use shelfsync_core::{REPORT_FILENAME, ReconcileEngine, write_unmatched_report};
use tracing::{debug, info};

mod cli;
mod summary;

use cli::Args;

/// Fixed library root; the tool always operates on `./ebooks`.
const SCAN_ROOT: &str = "./ebooks";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("ShelfSync starting");

    let engine = ReconcileEngine::new();
    let report = engine.run(Path::new(SCAN_ROOT), !args.quiet).await;

    // Per-item failures never abort the run; only a report write error does
    let report_path = write_unmatched_report(&report.unmatched_items, Path::new(REPORT_FILENAME))?;
    debug!(path = %report_path.display(), "Unmatched report written");

    summary::print_summary(&report);

    Ok(())
}
