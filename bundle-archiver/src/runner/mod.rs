//! Orchestrates one archival run.
//!
//! Detection runs concurrently; archival runs strictly one repository at a
//! time, pausing after each successful archive since upstream hosts and
//! storage endpoints throttle per source. A failure while processing one
//! repository is logged and recorded, never propagated: only bootstrap
//! failures abort the run.

mod config;
mod error;
mod state;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use state::RunState;

use crate::archive::Archiver;
use crate::commit::StateCommitter;
use crate::detect::{detect_changes, ChangeCandidate, Detection};
use crate::health::HostCheck;
use crate::notify::Notifier;
use crate::pacing::{FixedIntervalPacer, Pacer};
use crate::registry::{Host, Registry, Repository};
use crate::storage::ObjectStore;
use crate::summary::{FailureStage, ProcessingResult, RunSummary};
use crate::vcs::VcsClient;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

/// One unit of sequential work.
enum WorkItem {
    /// Remote unreachable; soft-delete without archiving.
    Delete(Repository),
    /// New history upstream; archive and advance the commit.
    Archive(ChangeCandidate),
}

impl WorkItem {
    fn repository_id(&self) -> i64 {
        match self {
            Self::Delete(repository) => repository.id,
            Self::Archive(candidate) => candidate.repository.id,
        }
    }
}

/// Orchestrates a full detection and archival run.
pub struct Runner {
    config: RunnerConfig,
    registry: Arc<dyn Registry>,
    vcs: Arc<dyn VcsClient>,
    store: Arc<dyn ObjectStore>,
    pacer: Arc<dyn Pacer>,
    host_check: Option<Arc<dyn HostCheck>>,
    notifier: Option<Arc<dyn Notifier>>,
    cancel: CancellationToken,
}

impl Runner {
    /// Builds a runner pacing archives at the configured fixed interval.
    pub fn new(
        config: RunnerConfig,
        registry: Arc<dyn Registry>,
        vcs: Arc<dyn VcsClient>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let pacer = Arc::new(FixedIntervalPacer::new(config.pacing()));
        Self {
            config,
            registry,
            vcs,
            store,
            pacer,
            host_check: None,
            notifier: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the pacing strategy.
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Requires `host_check` to pass before any repository head is queried.
    pub fn with_host_check(mut self, host_check: Arc<dyn HostCheck>) -> Self {
        self.host_check = Some(host_check);
        self
    }

    /// Sends the run summary to `notifier` when the run finishes.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Returns a token that stops the run before the next repository when cancelled.
    ///
    /// An in-flight clone or upload is not interrupted.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Executes the full orchestration flow.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] only when bootstrapping fails (registry
    /// unreachable, host not found or not answering, workspace not creatable).
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let span = info_span!("run", host = %self.config.host_name(), force = self.config.force());

        async {
            let mut state = RunState::Idle;
            match self.run_inner(&mut state).await {
                Ok(summary) => {
                    state.advance(RunState::Done);
                    Ok(summary)
                }
                Err(e) => {
                    state.advance(RunState::Aborted);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_inner(&self, state: &mut RunState) -> Result<RunSummary, RunnerError> {
        let mut summary = RunSummary::new(self.config.force());

        let host = self.registry.find_host(self.config.host_name()).await?;
        if let Some(check) = &self.host_check {
            check
                .check(&host)
                .await
                .map_err(|source| RunnerError::HostUnreachable {
                    host: host.name.clone(),
                    source,
                })?;
        }
        let repositories = self.registry.tracked_repositories(&host).await?;
        let (_temp_guard, workspace_base) = self.prepare_workspace()?;

        info!(repositories = repositories.len(), "Starting to update repositories");
        summary.total_scanned = repositories.len();

        state.advance(RunState::Detecting);
        let detection = detect_changes(
            self.vcs.as_ref(),
            &host,
            repositories,
            self.config.force(),
            self.config.concurrency(),
        )
        .await;
        summary.unchanged = detection.unchanged;
        summary.skipped = detection.skipped.len();

        let archiver = Archiver::new(self.vcs.clone(), self.store.clone(), workspace_base)
            .with_upload_timeout(self.config.upload_timeout());
        let committer = StateCommitter::new(self.registry.clone());

        let work = build_work_list(detection);
        let total = work.len();
        // Set after a successful archive; the next archive waits for the pacer.
        let mut pace_next = false;

        for (index, item) in work.into_iter().enumerate() {
            if pace_next && matches!(item, WorkItem::Archive(_)) {
                state.advance(RunState::CoolingDown);
                self.cool_down().await;
                pace_next = false;
            }

            if self.cancel.is_cancelled() {
                warn!(remaining = total - index, "Run cancelled, stopping before next repository");
                summary.cancelled = true;
                break;
            }

            let result = match item {
                WorkItem::Delete(repository) => self.delete(&committer, &repository).await,
                WorkItem::Archive(candidate) => {
                    self.archive(&archiver, &committer, &host, &candidate, state)
                        .await
                }
            };
            if matches!(result, ProcessingResult::Archived { .. }) {
                pace_next = true;
            }
            summary.record_result(&result);
        }

        info!(
            scanned = summary.total_scanned,
            updated = summary.total_updated,
            deleted = summary.deleted,
            failed = summary.failed,
            "Run complete"
        );

        if let Some(notifier) = &self.notifier {
            state.advance(RunState::Notifying);
            if let Err(e) = notifier.notify(&summary).await {
                warn!(error = %e, "Failed to send end-of-run notification");
            }
        }

        Ok(summary)
    }

    /// Returns the workspace base, creating a temporary one when none is configured.
    ///
    /// The returned guard removes the temporary directory when dropped.
    fn prepare_workspace(&self) -> Result<(Option<TempDir>, PathBuf), RunnerError> {
        if let Some(dir) = self.config.workspace_dir() {
            std::fs::create_dir_all(dir).map_err(|source| RunnerError::Workspace {
                path: dir.display().to_string(),
                source,
            })?;
            return Ok((None, dir.to_path_buf()));
        }

        let temp = tempfile::Builder::new()
            .prefix("bundle-archiver-")
            .tempdir()
            .map_err(|source| RunnerError::Workspace {
                path: std::env::temp_dir().display().to_string(),
                source,
            })?;
        let base = temp.path().to_path_buf();
        Ok((Some(temp), base))
    }

    /// Waits for the pacer, returning early if the run is cancelled.
    async fn cool_down(&self) {
        tokio::select! {
            _ = self.pacer.pause() => {}
            _ = self.cancel.cancelled() => {}
        }
    }

    async fn delete(&self, committer: &StateCommitter, repository: &Repository) -> ProcessingResult {
        match committer.mark_deleted(repository).await {
            Ok(()) => ProcessingResult::Deleted {
                repository: repository.full_name(),
            },
            Err(e) => {
                error!(
                    repository = %repository.full_name(),
                    error = %e,
                    "Failed to mark repository as deleted"
                );
                ProcessingResult::Failed {
                    repository: repository.full_name(),
                    stage: FailureStage::Delete,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn archive(
        &self,
        archiver: &Archiver,
        committer: &StateCommitter,
        host: &Host,
        candidate: &ChangeCandidate,
        state: &mut RunState,
    ) -> ProcessingResult {
        let repository = &candidate.repository;
        info!(repository = %repository.full_name(), commit = %candidate.new_commit_hash, "Updating");

        state.advance(RunState::Archiving);
        let receipt = match archiver.archive(repository, host).await {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(repository = %repository.full_name(), error = %e, "Failed to archive repository");
                return ProcessingResult::Failed {
                    repository: repository.full_name(),
                    stage: FailureStage::Archive,
                    error: e.to_string(),
                };
            }
        };

        state.advance(RunState::Committing);
        if let Err(e) = committer.advance_commit(candidate, &receipt).await {
            // The bundle is stored but the registry still points at the old
            // commit; the next run archives it again.
            error!(
                repository = %repository.full_name(),
                key = %receipt.key(),
                error = %e,
                "Bundle uploaded but failed to record commit"
            );
            return ProcessingResult::Failed {
                repository: repository.full_name(),
                stage: FailureStage::Commit,
                error: e.to_string(),
            };
        }

        info!(repository = %repository.full_name(), "Updated");
        ProcessingResult::Archived {
            repository: repository.full_name(),
            key: receipt.key().key(),
            commit: candidate.new_commit_hash.clone(),
        }
    }
}

/// Merges soft-deletes and candidates into one list ordered by repository id.
fn build_work_list(detection: Detection) -> Vec<WorkItem> {
    let mut work: Vec<WorkItem> = detection
        .unreachable
        .into_iter()
        .map(WorkItem::Delete)
        .chain(detection.candidates.into_iter().map(WorkItem::Archive))
        .collect();
    work.sort_by_key(WorkItem::repository_id);
    work
}
