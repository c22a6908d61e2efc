//! Durable work queue over the pages of an archive
//!
//! The state store owns the state file. It is created once by scanning the
//! archive, reloaded on every later run, and rewritten in full after every
//! processed page.
//!
//! # Persistence
//!
//! Every write goes to a temporary file in the state file's directory which is
//! then renamed over the state file. A crash leaves either the previous or the
//! new state on disk, never a mix of both.
//!
//! Only one process may use a state file at a time. Nothing enforces this.

pub mod discovery;
pub mod types;


use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::constants::state::STATE_VERSION;
use crate::errors::{StateError, StateResult};

pub use discovery::discover_pages;
pub use types::ProcessingState;
use types::VersionProbe;

/// Owner of the processing state and its file
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: ProcessingState,
}

impl StateStore {
    /// Loads the state file, or creates it by scanning `data_dir`
    ///
    /// Returns the store and whether it was freshly created.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if an existing state file cannot be loaded, if
    /// `data_dir` cannot be scanned, or if the new state cannot be persisted.
    pub fn initialize_if_absent(path: &Path, data_dir: &Path) -> StateResult<(Self, bool)> {
        if path.is_file() {
            return Ok((Self::load(path)?, false));
        }

        info!("Starting from scratch...");
        let pages = discover_pages(data_dir)?;
        info!("Found {} files...", pages.len());

        let store = Self {
            path: path.to_path_buf(),
            state: ProcessingState::new(pages),
        };
        store.persist()?;
        Ok((store, true))
    }

    /// Loads and validates an existing state file
    ///
    /// # Errors
    ///
    /// Returns `StateError::VersionMismatch` if the file was written by another
    /// schema version, `StateError::Parse` if it is not valid, and
    /// `StateError::Corrupted` if its lists overlap.
    pub fn load(path: &Path) -> StateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let probe: VersionProbe =
            serde_json::from_str(&content).map_err(|source| StateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if probe.version != u64::from(STATE_VERSION) {
            return Err(StateError::VersionMismatch {
                expected: STATE_VERSION,
                found: probe.version,
            });
        }

        let state: ProcessingState =
            serde_json::from_str(&content).map_err(|source| StateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        state.validate()?;

        info!("State loaded from file...");
        Ok(Self {
            path: path.to_path_buf(),
            state,
        })
    }

    /// Head of the queue, without removing it
    pub fn peek_next(&self) -> Option<&str> {
        self.state.remaining_files.first().map(String::as_str)
    }

    /// Marks `page` as processed and persists the state
    ///
    /// If persisting fails the in-memory state is left as it was before the
    /// call.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotQueued` if `page` is not waiting in the queue,
    /// or `StateError::Io` if the state file cannot be written.
    pub fn commit(&mut self, page: &str) -> StateResult<()> {
        let index = self.state.mark_processed(page)?;

        if let Err(e) = self.persist() {
            self.state.unmark_processed(index);
            return Err(e);
        }

        debug!("Committed {}", page);
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    /// Number of pages still to process
    pub fn remaining_count(&self) -> usize {
        self.state.remaining_files.len()
    }

    /// Number of pages already processed
    pub fn processed_count(&self) -> usize {
        self.state.processed_files.len()
    }

    /// Number of pages discovered when the state was created
    pub fn total_files(&self) -> usize {
        self.state.total_files()
    }

    /// Writes the whole state to disk through a temporary file
    fn persist(&self) -> StateResult<()> {
        let io_error = |source: std::io::Error| StateError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let json = serde_json::to_vec(&self.state).map_err(|e| io_error(e.into()))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
        temp.write_all(&json).map_err(io_error)?;
        temp.as_file().sync_all().map_err(io_error)?;
        temp.persist(&self.path).map_err(|e| io_error(e.error))?;

        debug!("State persisted to {}", self.path.display());
        Ok(())
    }
}
