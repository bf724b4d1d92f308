//! Run summary types.

use super::result::ProcessingResult;

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of tracked repositories scanned for changes.
    pub total_scanned: usize,

    /// Number of repositories archived and committed.
    pub total_updated: usize,

    /// Number of repositories without new history.
    pub unchanged: usize,

    /// Number of repositories soft-deleted.
    pub deleted: usize,

    /// Number of repositories whose processing failed.
    pub failed: usize,

    /// Number of repositories whose head could not be resolved this run.
    pub skipped: usize,

    /// Whether the run stopped early on request.
    pub cancelled: bool,

    /// Whether every reachable repository was archived regardless of changes.
    pub forced: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(forced: bool) -> Self {
        Self {
            forced,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        match result {
            ProcessingResult::Archived { .. } => self.total_updated += 1,
            ProcessingResult::Deleted { .. } => self.deleted += 1,
            ProcessingResult::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns true if any repository failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
