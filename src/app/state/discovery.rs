//! Discovery of the pages to process inside an archive root

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::constants::archive::{MESSAGES_DIR, PAGE_EXTENSION};
use crate::errors::{StateError, StateResult};

/// Finds every `messages/**/*.html` page below `data_dir`
///
/// Paths are returned relative to `data_dir`, with `/` separators, sorted so
/// that the processing order is stable across platforms.
///
/// # Errors
///
/// Returns `StateError::DataDirNotFound` if `data_dir` is not a directory and
/// `StateError::Io` if the tree cannot be walked.
pub fn discover_pages(data_dir: &Path) -> StateResult<Vec<String>> {
    if !data_dir.is_dir() {
        return Err(StateError::DataDirNotFound {
            path: data_dir.to_path_buf(),
        });
    }

    let messages_dir = data_dir.join(MESSAGES_DIR);
    if !messages_dir.is_dir() {
        warn!("No {} directory in {}", MESSAGES_DIR, data_dir.display());
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(&messages_dir).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| messages_dir.clone());
            StateError::Io {
                path,
                source: e.into(),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_page = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == PAGE_EXTENSION);
        if !is_page {
            continue;
        }

        if let Some(relative) = relative_page_path(data_dir, entry.path()) {
            pages.push(relative);
        }
    }

    pages.sort();
    debug!("Discovered {} pages under {}", pages.len(), messages_dir.display());
    Ok(pages)
}

/// Relative, `/`-separated form of `path` below `data_dir`
fn relative_page_path(data_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(data_dir).ok()?;
    let components: Option<Vec<&str>> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect();

    match components {
        Some(parts) => Some(parts.join("/")),
        None => {
            warn!("Skipping page with non UTF-8 path: {}", path.display());
            None
        }
    }
}
