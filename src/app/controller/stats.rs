//! Session statistics

use std::time::Duration;

use crate::app::page::PageReport;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The queue was exhausted
    Completed,
    /// A stop was requested and acknowledged between pages
    Stopped,
}

/// Totals for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Pages committed during this session
    pub pages_processed: usize,
    /// Pages written back
    pub pages_rewritten: usize,
    /// Images downloaded and embedded
    pub images_embedded: usize,
    /// Images that could not be downloaded
    pub images_failed: usize,
    /// Pages still queued when the session ended
    pub pages_remaining: usize,
}

impl SessionSummary {
    /// Adds one page's report to the totals
    pub fn record(&mut self, report: &PageReport) {
        self.pages_processed += 1;
        if report.rewritten {
            self.pages_rewritten += 1;
        }
        self.images_embedded += report.embedded;
        self.images_failed += report.failed;
    }
}

/// Result of a run
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// How the run ended
    pub outcome: RunOutcome,
    /// Session totals
    pub summary: SessionSummary,
    /// Wall-clock duration
    pub duration: Duration,
}

impl SessionResult {
    /// Human-readable closing line
    pub fn closing_message(&self) -> &'static str {
        match self.outcome {
            RunOutcome::Completed => "All done",
            RunOutcome::Stopped => "Stopped by Ctrl-C",
        }
    }
}
