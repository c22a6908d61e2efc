//! Writing downloaded attachment bytes to disk
//!
//! The body is written to a temporary sibling and renamed into place, so an
//! interrupted write never leaves a truncated image under the final name.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::constants::files;
use crate::errors::{FetchError, FetchResult};

/// Returns the temporary path used while writing `destination`
pub(crate) fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(files::TEMP_FILE_SUFFIX);
    destination.with_file_name(name)
}

/// Writes `bytes` to `destination`, replacing any existing file
///
/// # Errors
///
/// Returns `FetchError::Write` if the temporary file cannot be created or
/// written, or if it cannot be renamed over the destination.
pub async fn write_atomically(destination: &Path, bytes: &[u8]) -> FetchResult<()> {
    let temp_path = temp_path_for(destination);

    let result = async {
        let mut file = File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&temp_path, destination).await
    }
    .await;

    if let Err(source) = result {
        if tokio::fs::try_exists(&temp_path).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(&temp_path).await;
        }
        return Err(FetchError::Write {
            path: destination.to_path_buf(),
            source,
        });
    }

    tracing::debug!("Wrote {} bytes to {}", bytes.len(), destination.display());
    Ok(())
}
