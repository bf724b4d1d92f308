//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bundle_archiver::{
    HealthError, Host, HostCheck, NotificationPayload, Notifier, NotifyError, ObjectStore, Pacer, Registry,
    RegistryError, Repository, RunSummary, StorageError, VcsClient, VcsError,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HOST_NAME: &str = "github";
pub const HOST_PREFIX: &str = "https://git.example.com/";

pub fn host() -> Host {
    Host::new(HOST_NAME, HOST_PREFIX)
}

pub fn repository(id: i64, name: &str, last_commit_hash: &str) -> Repository {
    Repository {
        id,
        owner: "acme".to_string(),
        name: name.to_string(),
        host_name: HOST_NAME.to_string(),
        last_commit_hash: last_commit_hash.to_string(),
        deleted: false,
    }
}

pub fn url_of(repository: &Repository) -> String {
    host().remote_url(repository)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registry backed by a map, recording every write.
#[derive(Default)]
pub struct FakeRegistry {
    hosts: Vec<Host>,
    repositories: Mutex<HashMap<i64, Repository>>,
    fail_commit_updates: bool,
    unreachable: bool,
    pub commit_updates: Mutex<Vec<(i64, String)>>,
    pub deletions: Mutex<Vec<i64>>,
}

impl FakeRegistry {
    pub fn new(repositories: Vec<Repository>) -> Self {
        Self {
            hosts: vec![host()],
            repositories: Mutex::new(repositories.into_iter().map(|r| (r.id, r)).collect()),
            ..Default::default()
        }
    }

    pub fn without_hosts(mut self) -> Self {
        self.hosts.clear();
        self
    }

    pub fn failing_commit_updates(mut self) -> Self {
        self.fail_commit_updates = true;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn get(&self, id: i64) -> Repository {
        self.repositories.lock().unwrap()[&id].clone()
    }
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn find_host(&self, name: &str) -> Result<Host, RegistryError> {
        if self.unreachable {
            return Err(RegistryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .cloned()
            .ok_or_else(|| RegistryError::HostNotFound {
                name: name.to_string(),
            })
    }

    async fn tracked_repositories(&self, host: &Host) -> Result<Vec<Repository>, RegistryError> {
        let mut repositories: Vec<Repository> = self
            .repositories
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.host_name == host.name && !r.deleted)
            .cloned()
            .collect();
        repositories.sort_by_key(|r| r.id);
        Ok(repositories)
    }

    async fn mark_deleted(&self, id: i64) -> Result<(), RegistryError> {
        let mut repositories = self.repositories.lock().unwrap();
        let repository = repositories
            .get_mut(&id)
            .ok_or(RegistryError::RepositoryNotFound { id })?;
        repository.deleted = true;
        self.deletions.lock().unwrap().push(id);
        Ok(())
    }

    async fn set_last_commit(&self, id: i64, hash: &str) -> Result<(), RegistryError> {
        if self.fail_commit_updates {
            return Err(RegistryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut repositories = self.repositories.lock().unwrap();
        let repository = repositories
            .get_mut(&id)
            .ok_or(RegistryError::RepositoryNotFound { id })?;
        repository.last_commit_hash = hash.to_string();
        self.commit_updates
            .lock()
            .unwrap()
            .push((id, hash.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// VCS
// ---------------------------------------------------------------------------

/// Scripted answer to a HEAD query.
#[derive(Debug, Clone)]
pub enum Head {
    Commit(String),
    Unreachable,
    TimedOut,
}

/// Scripted answer to a bundle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bundle {
    Ok,
    CloneFails,
    BundleFails,
}

/// VCS client answering from scripted tables.
#[derive(Default)]
pub struct FakeVcs {
    heads: HashMap<String, Head>,
    delays: HashMap<String, Duration>,
    bundles: HashMap<String, Bundle>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub head_calls: AtomicUsize,
    pub bundle_calls: Mutex<Vec<String>>,
    pub workspaces: Mutex<Vec<PathBuf>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(mut self, repository: &Repository, head: Head) -> Self {
        self.heads.insert(url_of(repository), head);
        self
    }

    pub fn commit(self, repository: &Repository, hash: &str) -> Self {
        self.head(repository, Head::Commit(hash.to_string()))
    }

    pub fn delay(mut self, repository: &Repository, delay: Duration) -> Self {
        self.delays.insert(url_of(repository), delay);
        self
    }

    pub fn bundle(mut self, repository: &Repository, bundle: Bundle) -> Self {
        self.bundles.insert(url_of(repository), bundle);
        self
    }

    pub fn bundled_urls(&self) -> Vec<String> {
        self.bundle_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VcsClient for FakeVcs {
    async fn head_hash(&self, remote_url: &str) -> Result<String, VcsError> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self
            .delays
            .get(remote_url)
            .copied()
            .unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.heads.get(remote_url) {
            Some(Head::Commit(hash)) => Ok(hash.clone()),
            Some(Head::TimedOut) => Err(VcsError::Timeout {
                command: "ls-remote".to_string(),
                timeout_secs: 60,
            }),
            Some(Head::Unreachable) | None => Err(VcsError::RemoteUnreachable {
                url: remote_url.to_string(),
                message: "repository not found".to_string(),
            }),
        }
    }

    async fn create_bundle(&self, remote_url: &str, workspace: &Path) -> Result<PathBuf, VcsError> {
        self.bundle_calls
            .lock()
            .unwrap()
            .push(remote_url.to_string());
        self.workspaces.lock().unwrap().push(workspace.to_path_buf());

        // Leave something behind in the clone directory, like a real clone would.
        let checkout = workspace.join("checkout");
        std::fs::create_dir_all(&checkout).unwrap();
        std::fs::write(checkout.join("README"), "contents").unwrap();

        match self.bundles.get(remote_url).copied().unwrap_or(Bundle::Ok) {
            Bundle::Ok => {
                let path = workspace.join("snapshot.bundle");
                std::fs::write(&path, format!("bundle of {remote_url}")).unwrap();
                Ok(path)
            }
            Bundle::CloneFails => Err(VcsError::CloneFailed {
                url: remote_url.to_string(),
                message: "fatal: could not read from remote".to_string(),
            }),
            Bundle::BundleFails => Err(VcsError::BundleFailed {
                url: remote_url.to_string(),
                message: "fatal: refusing to create empty bundle".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// A recorded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub key: String,
    pub local_path: PathBuf,
    pub contents: String,
}

/// Object store keeping uploads in memory.
#[derive(Default)]
pub struct FakeStore {
    fail: bool,
    pub uploads: Mutex<Vec<Upload>>,
    pub attempts: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.key.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StorageError::UploadFailed {
                key: key.to_string(),
                message: "503 Slow Down".to_string(),
            });
        }

        let contents =
            std::fs::read_to_string(local_path).map_err(|e| StorageError::ReadFailed {
                path: local_path.display().to_string(),
                message: e.to_string(),
            })?;
        self.uploads.lock().unwrap().push(Upload {
            key: key.to_string(),
            local_path: local_path.to_path_buf(),
            contents,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Host check
// ---------------------------------------------------------------------------

/// Host check with a scripted answer, counting calls.
#[derive(Default)]
pub struct FakeHostCheck {
    down: bool,
    pub checks: AtomicUsize,
}

impl FakeHostCheck {
    pub fn up() -> Self {
        Self::default()
    }

    pub fn down() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl HostCheck for FakeHostCheck {
    async fn check(&self, host: &Host) -> Result<(), HealthError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(HealthError::Status {
                url: host.remote_prefix.clone(),
                status: 503,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier and pacer
// ---------------------------------------------------------------------------

/// Notifier recording every payload.
#[derive(Default)]
pub struct FakeNotifier {
    fail: bool,
    pub payloads: Mutex<Vec<NotificationPayload>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), NotifyError> {
        self.payloads
            .lock()
            .unwrap()
            .push(NotificationPayload::from(summary));
        if self.fail {
            return Err(NotifyError::Status { status: 502 });
        }
        Ok(())
    }
}

/// Pacer that never waits but counts how often it was asked to.
#[derive(Default)]
pub struct CountingPacer {
    pub pauses: AtomicUsize,
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}
