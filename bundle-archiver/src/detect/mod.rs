//! Change detection across tracked repositories.
//!
//! Remote HEADs are resolved concurrently, bounded by a fixed limit so the
//! upstream host is never flooded. Each lookup produces one [`HeadOutcome`];
//! the outcomes are folded into a [`Detection`] by the single task polling
//! the stream, so no worker ever touches a shared collection.

mod detection;

pub use detection::{ChangeCandidate, Detection, HeadOutcome, SkippedRepository};

use crate::registry::{Host, Repository};
use crate::vcs::VcsClient;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, info_span, warn, Instrument};

/// Default number of concurrent remote HEAD queries.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Resolves the remote HEAD of every repository and partitions them.
///
/// A repository becomes a [`ChangeCandidate`] when its remote HEAD differs
/// from the recorded commit, or when `force` is set. Repositories whose remote
/// is unreachable are returned for soft-deletion; this function never writes
/// to the registry itself.
///
/// At most `concurrency` queries run at once (a limit of zero is treated as one).
pub async fn detect_changes(
    vcs: &dyn VcsClient,
    host: &Host,
    repositories: Vec<Repository>,
    force: bool,
    concurrency: usize,
) -> Detection {
    let span = info_span!("detect", host = %host.name, force, concurrency);

    async {
        info!(count = repositories.len(), "Resolving remote heads");

        let outcomes: Vec<HeadOutcome> = stream::iter(repositories)
            .map(|repository| query_head(vcs, host, repository, force))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

        let detection = Detection::from_outcomes(outcomes);
        info!(
            changed = detection.candidates.len(),
            unchanged = detection.unchanged,
            unreachable = detection.unreachable.len(),
            skipped = detection.skipped.len(),
            "Detection complete"
        );
        detection
    }
    .instrument(span)
    .await
}

/// Resolves a single repository's remote HEAD.
async fn query_head(
    vcs: &dyn VcsClient,
    host: &Host,
    repository: Repository,
    force: bool,
) -> HeadOutcome {
    let url = host.remote_url(&repository);

    match vcs.head_hash(&url).await {
        Ok(hash) if force || hash != repository.last_commit_hash => {
            debug!(repository = %repository.full_name(), commit = %hash, "New history upstream");
            HeadOutcome::Changed(ChangeCandidate {
                repository,
                new_commit_hash: hash,
            })
        }
        Ok(_) => {
            debug!(repository = %repository.full_name(), "No new commits");
            HeadOutcome::Unchanged(repository)
        }
        Err(e) if e.is_unreachable() => {
            warn!(repository = %repository.full_name(), error = %e, "Remote unreachable");
            HeadOutcome::Unreachable(repository)
        }
        Err(e) => {
            warn!(repository = %repository.full_name(), error = %e, "Failed to resolve remote head");
            HeadOutcome::Skipped(SkippedRepository {
                repository,
                reason: e.to_string(),
            })
        }
    }
}
