#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod archive;
pub mod commit;
pub mod config;
pub mod detect;
pub mod health;
pub mod notify;
pub mod pacing;
pub mod registry;
pub mod runner;
pub mod shard;
pub mod storage;
pub mod summary;
pub mod vcs;

pub use archive::{ArchiveError, Archiver, UploadReceipt};
pub use commit::{CommitError, StateCommitter};
pub use config::{ConfigError, Settings};
pub use detect::{
    detect_changes, ChangeCandidate, Detection, HeadOutcome, SkippedRepository,
    DEFAULT_CONCURRENCY,
};
pub use health::{HealthError, HostCheck, HttpHostCheck, DEFAULT_HOST_CHECK_TIMEOUT};
pub use notify::{NotificationPayload, Notifier, NotifierConfig, NotifyError, WebhookNotifier};
pub use pacing::{FixedIntervalPacer, Pacer, DEFAULT_PACING_INTERVAL};
pub use registry::{Host, PgRegistry, Registry, RegistryError, Repository};
pub use runner::{RunState, Runner, RunnerConfig, RunnerError};
pub use shard::{shard, ShardedKey};
pub use storage::{ObjectStore, S3Store, StorageConfig, StorageError};
pub use summary::{FailureStage, ProcessingResult, RunSummary};
pub use vcs::{GitCli, VcsClient, VcsError, DEFAULT_CLONE_DEPTH};
