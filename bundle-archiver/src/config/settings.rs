//! Tuning settings loaded from an optional TOML file.

use super::ConfigError;
use crate::archive::DEFAULT_UPLOAD_TIMEOUT;
use crate::detect::DEFAULT_CONCURRENCY;
use crate::health::DEFAULT_HOST_CHECK_TIMEOUT;
use crate::pacing::DEFAULT_PACING_INTERVAL;
use crate::vcs::DEFAULT_CLONE_DEPTH;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Parsed content of a settings file such as `archiver.toml`:
///
/// ```toml
/// concurrency = 10
/// pacing-secs = 5
/// clone-depth = 100
/// head-timeout-secs = 60
/// bundle-timeout-secs = 900
/// upload-timeout-secs = 600
/// notify-timeout-secs = 10
/// host-check-timeout-secs = 30
/// workspace-dir = "/var/tmp/bundle-archiver"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Settings {
    /// Maximum concurrent remote HEAD queries.
    pub concurrency: usize,

    /// Delay between archive operations, in seconds.
    pub pacing_secs: u64,

    /// Number of commits fetched per clone.
    pub clone_depth: u32,

    /// Timeout for a remote HEAD query, in seconds.
    pub head_timeout_secs: u64,

    /// Timeout for cloning and bundling one repository, in seconds.
    pub bundle_timeout_secs: u64,

    /// Timeout for uploading one bundle, in seconds.
    pub upload_timeout_secs: u64,

    /// Timeout for the end-of-run notification, in seconds.
    pub notify_timeout_secs: u64,

    /// Timeout for the start-of-run host check, in seconds.
    pub host_check_timeout_secs: u64,

    /// Fixed workspace directory. A fresh temporary directory is used when unset.
    pub workspace_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            pacing_secs: DEFAULT_PACING_INTERVAL.as_secs(),
            clone_depth: DEFAULT_CLONE_DEPTH,
            head_timeout_secs: 60,
            bundle_timeout_secs: 900,
            upload_timeout_secs: DEFAULT_UPLOAD_TIMEOUT.as_secs(),
            notify_timeout_secs: 10,
            host_check_timeout_secs: DEFAULT_HOST_CHECK_TIMEOUT.as_secs(),
            workspace_dir: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;

        let settings: Self = toml::from_str(&contents).map_err(|source| ConfigError::TomlError {
            path: path.display().to_string(),
            source,
        })?;

        settings.validate(path)?;
        debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Loads settings from `path` if the file exists, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file is invalid.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::ValidationError {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if self.concurrency == 0 {
            return Err(invalid("concurrency must be at least 1"));
        }
        if self.clone_depth == 0 {
            return Err(invalid("clone-depth must be at least 1"));
        }
        if self.head_timeout_secs == 0
            || self.bundle_timeout_secs == 0
            || self.upload_timeout_secs == 0
            || self.notify_timeout_secs == 0
            || self.host_check_timeout_secs == 0
        {
            return Err(invalid("timeouts must be at least 1 second"));
        }
        Ok(())
    }

    /// Returns the pacing interval.
    pub fn pacing(&self) -> Duration {
        Duration::from_secs(self.pacing_secs)
    }

    /// Returns the remote HEAD query timeout.
    pub fn head_timeout(&self) -> Duration {
        Duration::from_secs(self.head_timeout_secs)
    }

    /// Returns the clone-and-bundle timeout.
    pub fn bundle_timeout(&self) -> Duration {
        Duration::from_secs(self.bundle_timeout_secs)
    }

    /// Returns the upload timeout.
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Returns the notification timeout.
    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }

    /// Returns the host check timeout.
    pub fn host_check_timeout(&self) -> Duration {
        Duration::from_secs(self.host_check_timeout_secs)
    }
}
