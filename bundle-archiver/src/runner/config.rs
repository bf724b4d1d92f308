//! Runner configuration.

use crate::archive::DEFAULT_UPLOAD_TIMEOUT;
use crate::config::Settings;
use crate::detect::DEFAULT_CONCURRENCY;
use crate::pacing::DEFAULT_PACING_INTERVAL;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one archival run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Name of the host whose repositories are archived.
    host_name: String,
    /// Whether to archive every reachable repository regardless of changes.
    force: bool,
    /// Maximum concurrent remote HEAD queries.
    concurrency: usize,
    /// Delay between archive operations.
    pacing: Duration,
    /// Time allowed for a single upload.
    upload_timeout: Duration,
    /// Fixed workspace directory; a temporary one is created per run when unset.
    workspace_dir: Option<PathBuf>,
}

impl RunnerConfig {
    /// Creates a new configuration with default tuning.
    pub fn new(host_name: impl Into<String>, force: bool) -> Self {
        Self {
            host_name: host_name.into(),
            force,
            concurrency: DEFAULT_CONCURRENCY,
            pacing: DEFAULT_PACING_INTERVAL,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            workspace_dir: None,
        }
    }

    /// Applies tuning values from a settings file.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.concurrency = settings.concurrency;
        self.pacing = settings.pacing();
        self.upload_timeout = settings.upload_timeout();
        self.workspace_dir = settings.workspace_dir.clone();
        self
    }

    /// Sets the detection concurrency limit. Zero is raised to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the delay between archive operations.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Sets the upload timeout.
    pub fn with_upload_timeout(mut self, upload_timeout: Duration) -> Self {
        self.upload_timeout = upload_timeout;
        self
    }

    /// Sets a fixed workspace directory.
    pub fn with_workspace_dir(mut self, workspace_dir: PathBuf) -> Self {
        self.workspace_dir = Some(workspace_dir);
        self
    }

    /// Returns the host name.
    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    /// Returns whether force mode is enabled.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Returns the detection concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the delay between archive operations.
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Returns the upload timeout.
    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    /// Returns the fixed workspace directory, if any.
    pub fn workspace_dir(&self) -> Option<&Path> {
        self.workspace_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_defaults() {
        let config = RunnerConfig::new("github", false);

        assert_eq!(config.host_name(), "github");
        assert!(!config.force());
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.pacing(), DEFAULT_PACING_INTERVAL);
        assert_eq!(config.workspace_dir(), None);
    }

    #[test]
    fn applies_settings() {
        let settings = Settings {
            concurrency: 3,
            pacing_secs: 1,
            upload_timeout_secs: 30,
            workspace_dir: Some(PathBuf::from("/tmp/work")),
            ..Settings::default()
        };

        let config = RunnerConfig::new("github", true).with_settings(&settings);

        assert_eq!(config.concurrency(), 3);
        assert_eq!(config.pacing(), Duration::from_secs(1));
        assert_eq!(config.upload_timeout(), Duration::from_secs(30));
        assert_eq!(config.workspace_dir(), Some(Path::new("/tmp/work")));
    }

    #[test]
    fn clamps_zero_concurrency() {
        let config = RunnerConfig::new("github", false).with_concurrency(0);
        assert_eq!(config.concurrency(), 1);
    }
}
