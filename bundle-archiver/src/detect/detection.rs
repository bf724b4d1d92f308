//! Detection result types.

use crate::registry::Repository;

/// A repository with new upstream history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCandidate {
    /// The tracked repository.
    pub repository: Repository,

    /// Commit the remote HEAD currently points to.
    pub new_commit_hash: String,
}

/// A repository left alone this run because its HEAD could not be resolved
/// for a reason other than the remote being gone (e.g., a timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRepository {
    /// The tracked repository.
    pub repository: Repository,

    /// Why the head query failed.
    pub reason: String,
}

/// Outcome of probing one repository.
#[derive(Debug, Clone)]
pub enum HeadOutcome {
    /// Remote HEAD differs from the recorded commit, or the run is forced.
    Changed(ChangeCandidate),

    /// Remote HEAD equals the recorded commit.
    Unchanged(Repository),

    /// Remote cannot be reached; the repository should be soft-deleted.
    Unreachable(Repository),

    /// Head query failed; retried next run.
    Skipped(SkippedRepository),
}

/// Partitioned result of a detection pass.
///
/// `candidates` and `unreachable` are sorted by repository id, so the result
/// does not depend on the order in which head queries finished.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Repositories to archive.
    pub candidates: Vec<ChangeCandidate>,

    /// Repositories to soft-delete.
    pub unreachable: Vec<Repository>,

    /// Repositories whose head query failed transiently.
    pub skipped: Vec<SkippedRepository>,

    /// Number of repositories without new history.
    pub unchanged: usize,
}

impl Detection {
    /// Folds head query outcomes into a detection result.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = HeadOutcome>) -> Self {
        let mut detection = Self::default();

        for outcome in outcomes {
            match outcome {
                HeadOutcome::Changed(candidate) => detection.candidates.push(candidate),
                HeadOutcome::Unchanged(_) => detection.unchanged += 1,
                HeadOutcome::Unreachable(repository) => detection.unreachable.push(repository),
                HeadOutcome::Skipped(skipped) => detection.skipped.push(skipped),
            }
        }

        detection.candidates.sort_by_key(|c| c.repository.id);
        detection.unreachable.sort_by_key(|r| r.id);
        detection.skipped.sort_by_key(|s| s.repository.id);
        detection
    }

    /// Returns true if nothing needs archiving or deleting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.unreachable.is_empty()
    }
}
