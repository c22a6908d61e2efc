//! Command-line argument parsing for the archive localizer
//!
//! The tool takes exactly one argument, the root of an exported archive.
//! Everything else comes from the optional configuration file.

use std::path::PathBuf;

use clap::Parser;

/// Archive Localizer - embed the images of an exported chat archive
#[derive(Parser, Debug)]
#[command(
    name = "archive_localizer",
    version,
    about = "Download the images of an exported chat archive and embed them in its pages",
    long_about = "Walks the messages/ directory of an exported chat archive, downloads every image
attachment next to the page that links to it, and rewrites the page to show the local copy.
Progress is saved after every page, so an interrupted run resumes where it stopped."
)]
pub struct Cli {
    /// Root directory of the exported archive (contains messages/)
    #[arg(value_name = "ARCHIVE_ROOT")]
    pub archive_root: PathBuf,
}

impl Cli {
    /// One-line usage shown on malformed invocations
    pub fn usage() -> String {
        format!("Usage: {} <ARCHIVE_ROOT>", env!("CARGO_PKG_NAME"))
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if !self.archive_root.is_dir() {
            return Err(format!(
                "Archive root is not a directory: {}",
                self.archive_root.display()
            ));
        }
        Ok(())
    }
}
