//! Persisted processing state

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::state::STATE_VERSION;
use crate::errors::{StateError, StateResult};

/// The single persisted aggregate of a run
///
/// `remaining_files` and `processed_files` partition the set of pages that
/// was discovered when the state was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingState {
    /// Schema version
    pub version: u32,
    /// Pages still to process, in processing order
    pub remaining_files: Vec<String>,
    /// Pages already processed, in completion order
    pub processed_files: Vec<String>,
}

/// Minimal view of a state file used to check the schema before full parsing
#[derive(Debug, Deserialize)]
pub(crate) struct VersionProbe {
    pub version: u64,
}

impl ProcessingState {
    /// Create a fresh state with every discovered page remaining
    pub fn new(discovered: Vec<String>) -> Self {
        Self {
            version: STATE_VERSION,
            remaining_files: discovered,
            processed_files: Vec::new(),
        }
    }

    /// Number of pages discovered when the state was created
    pub fn total_files(&self) -> usize {
        self.remaining_files.len() + self.processed_files.len()
    }

    /// Check that the two lists partition the discovered set
    pub fn validate(&self) -> StateResult<()> {
        let mut seen = HashSet::with_capacity(self.total_files());

        for path in &self.remaining_files {
            if !seen.insert(path.as_str()) {
                return Err(StateError::Corrupted {
                    reason: format!("{} is queued more than once", path),
                });
            }
        }

        for path in &self.processed_files {
            if !seen.insert(path.as_str()) {
                return Err(StateError::Corrupted {
                    reason: format!("{} is both processed and queued, or processed twice", path),
                });
            }
        }

        Ok(())
    }

    /// Move `path` from the remaining queue to the processed log
    ///
    /// Returns the index it occupied in the queue so the move can be undone.
    pub(crate) fn mark_processed(&mut self, path: &str) -> StateResult<usize> {
        let index = self
            .remaining_files
            .iter()
            .position(|p| p == path)
            .ok_or_else(|| StateError::NotQueued {
                path: path.to_string(),
            })?;

        let moved = self.remaining_files.remove(index);
        self.processed_files.push(moved);
        Ok(index)
    }

    /// Undo the last `mark_processed`
    pub(crate) fn unmark_processed(&mut self, index: usize) {
        if let Some(path) = self.processed_files.pop() {
            self.remaining_files.insert(index, path);
        }
    }
}
