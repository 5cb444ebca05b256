//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Reconcile and organize a local e-book library.
///
/// ShelfSync scans the `./ebooks` directory for EPUB files, looks each one
/// up in the Google Books catalog, and normalizes matched items in place:
/// folder rename, `metadata.opf` descriptor, and cover image.
#[derive(Parser, Debug)]
#[command(name = "shelfsync")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
