//! Resume loop over the work queue
//!
//! The controller takes the head of the queue, transforms that page, commits
//! it, and repeats until the queue is empty or a stop was requested. The stop
//! flag is only read at the top of the loop, so a page is always either fully
//! processed and committed, or left at the head of the queue.
//!
//! # Phases
//!
//! ```text
//! Discovering (first run only) -> Running -> Stopping -> Done
//!                                    \_________________-> Done (queue empty)
//! ```
//!
//! A fatal page error ends the run with the failing page still queued. The
//! next run starts again from that page.

pub mod signals;
pub mod stats;


use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::app::page::PageTransformer;
use crate::app::state::StateStore;
use crate::errors::Result;

pub use signals::{SignalHandler, StopFlag};
pub use stats::{RunOutcome, SessionResult, SessionSummary};

/// Phase of the run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Scanning the archive to build the queue
    Discovering,
    /// Processing pages
    Running,
    /// Stop acknowledged, winding down
    Stopping,
    /// Terminal
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Discovering => "discovering",
            RunPhase::Running => "running",
            RunPhase::Stopping => "stopping",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Drives pages from the state store through the page transformer
pub struct RunController {
    store: StateStore,
    transformer: PageTransformer,
    data_dir: PathBuf,
    stop: StopFlag,
    phase: RunPhase,
}

impl RunController {
    /// Create a controller over an initialized state store
    pub fn new(
        store: StateStore,
        transformer: PageTransformer,
        data_dir: PathBuf,
        stop: StopFlag,
    ) -> Self {
        Self {
            store,
            transformer,
            data_dir,
            stop,
            phase: RunPhase::Running,
        }
    }

    /// Loads the state file, discovering the archive's pages on the first run
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be loaded or created.
    pub fn initialize(
        state_file: &Path,
        data_dir: PathBuf,
        transformer: PageTransformer,
        stop: StopFlag,
    ) -> Result<Self> {
        let (store, created) = StateStore::initialize_if_absent(state_file, &data_dir)?;

        let mut controller = Self::new(store, transformer, data_dir, stop);
        if created {
            controller.phase = RunPhase::Discovering;
            controller.transition(RunPhase::Running);
        }
        Ok(controller)
    }

    /// Current phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// The state store driven by this controller
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Consumes the controller, returning its state store
    pub fn into_store(self) -> StateStore {
        self.store
    }

    /// Runs until the queue is empty or a stop is requested
    ///
    /// # Errors
    ///
    /// Returns an error if a page fails fatally or the state cannot be
    /// committed. The page involved stays at the head of the queue.
    pub async fn run(&mut self) -> Result<SessionResult> {
        let started = Instant::now();
        let mut summary = SessionSummary::default();

        let outcome = loop {
            if self.stop.is_requested() {
                self.transition(RunPhase::Stopping);
                break RunOutcome::Stopped;
            }

            let Some(next) = self.store.peek_next().map(str::to_string) else {
                break RunOutcome::Completed;
            };

            info!("{} files left...", self.store.remaining_count());
            info!("Processing {}...", next);

            let page = self.data_dir.join(&next);
            let report = self.transformer.transform(&page).await?;
            self.store.commit(&next)?;
            summary.record(&report);

            debug!("Committed {} ({} remaining)", next, self.store.remaining_count());
        };

        self.transition(RunPhase::Done);
        summary.pages_remaining = self.store.remaining_count();

        Ok(SessionResult {
            outcome,
            summary,
            duration: started.elapsed(),
        })
    }

    fn transition(&mut self, phase: RunPhase) {
        debug!("Run phase {} -> {}", self.phase, phase);
        self.phase = phase;
    }
}
