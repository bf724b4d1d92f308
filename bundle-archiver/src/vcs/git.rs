//! [`VcsClient`] backed by the system `git` binary.

use super::{VcsClient, VcsError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::debug;

/// Number of commits fetched when cloning a remote for bundling.
pub const DEFAULT_CLONE_DEPTH: u32 = 100;

/// Default time allowed for resolving a remote HEAD.
const DEFAULT_HEAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time allowed for cloning and bundling together.
const DEFAULT_BUNDLE_TIMEOUT: Duration = Duration::from_secs(900);

/// Directory inside the workspace that receives the clone.
const CHECKOUT_DIR: &str = "checkout";

/// Bundle file name inside the workspace.
const BUNDLE_FILE: &str = "snapshot.bundle";

/// Runs `git ls-remote`, `git clone` and `git bundle` as child processes.
#[derive(Debug, Clone)]
pub struct GitCli {
    clone_depth: u32,
    head_timeout: Duration,
    bundle_timeout: Duration,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            clone_depth: DEFAULT_CLONE_DEPTH,
            head_timeout: DEFAULT_HEAD_TIMEOUT,
            bundle_timeout: DEFAULT_BUNDLE_TIMEOUT,
        }
    }
}

impl GitCli {
    /// Creates a client with default depth and timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clone depth. A depth of zero is raised to one.
    pub fn with_clone_depth(mut self, clone_depth: u32) -> Self {
        self.clone_depth = clone_depth.max(1);
        self
    }

    /// Sets the timeout for resolving a remote HEAD.
    pub fn with_head_timeout(mut self, head_timeout: Duration) -> Self {
        self.head_timeout = head_timeout;
        self
    }

    /// Sets the combined timeout for cloning and bundling.
    pub fn with_bundle_timeout(mut self, bundle_timeout: Duration) -> Self {
        self.bundle_timeout = bundle_timeout;
        self
    }

    /// Returns the configured clone depth.
    pub fn clone_depth(&self) -> u32 {
        self.clone_depth
    }
}

#[async_trait]
impl VcsClient for GitCli {
    async fn head_hash(&self, remote_url: &str) -> Result<String, VcsError> {
        let mut cmd = git_command();
        cmd.args(["ls-remote", "--", remote_url, "HEAD"]);

        let deadline = Instant::now() + self.head_timeout;
        let output = run(cmd, "ls-remote", deadline, self.head_timeout).await?;

        if !output.status.success() {
            return Err(VcsError::RemoteUnreachable {
                url: remote_url.to_string(),
                message: stderr_of(&output),
            });
        }

        parse_head(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            VcsError::RemoteUnreachable {
                url: remote_url.to_string(),
                message: "no HEAD reference advertised".to_string(),
            }
        })
    }

    async fn create_bundle(
        &self,
        remote_url: &str,
        workspace: &Path,
    ) -> Result<PathBuf, VcsError> {
        let checkout = workspace.join(CHECKOUT_DIR);
        let deadline = Instant::now() + self.bundle_timeout;

        debug!(url = %remote_url, depth = self.clone_depth, "Cloning repository");
        let mut clone = git_command();
        clone
            .arg("clone")
            .arg(format!("--depth={}", self.clone_depth))
            .arg("--")
            .arg(remote_url)
            .arg(&checkout);

        let output = run(clone, "clone", deadline, self.bundle_timeout).await?;
        if !output.status.success() {
            return Err(VcsError::CloneFailed {
                url: remote_url.to_string(),
                message: stderr_of(&output),
            });
        }

        debug!(url = %remote_url, "Creating bundle");
        let mut bundle = git_command();
        bundle
            .current_dir(&checkout)
            .args(["bundle", "create"])
            .arg(Path::new("..").join(BUNDLE_FILE))
            .arg("HEAD");

        let output = run(bundle, "bundle create", deadline, self.bundle_timeout).await?;
        if !output.status.success() {
            return Err(VcsError::BundleFailed {
                url: remote_url.to_string(),
                message: stderr_of(&output),
            });
        }

        Ok(workspace.join(BUNDLE_FILE))
    }
}

/// Builds a non-interactive `git` command.
fn git_command() -> Command {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Runs a git command to completion, killing it if `deadline` passes first.
async fn run(
    mut cmd: Command,
    label: &str,
    deadline: Instant,
    budget: Duration,
) -> Result<Output, VcsError> {
    match tokio::time::timeout_at(deadline, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(VcsError::Spawn {
            command: label.to_string(),
            source,
        }),
        Err(_) => Err(VcsError::Timeout {
            command: label.to_string(),
            timeout_secs: budget.as_secs(),
        }),
    }
}

fn stderr_of(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}

/// Extracts the HEAD commit from `git ls-remote` output.
///
/// Each line has the form `<object-id>\t<ref>`.
fn parse_head(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let hash = fields.next()?;
        let reference = fields.next()?;
        (reference == "HEAD" && is_object_id(hash)).then(|| hash.to_string())
    })
}

/// SHA-1 (40) or SHA-256 (64) hex object ids.
fn is_object_id(value: &str) -> bool {
    matches!(value.len(), 40 | 64) && value.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "3f786850e387550fdab836ed7e6dc881de23001b";

    #[test]
    fn parses_head_line() {
        let stdout = format!("{SHA}\tHEAD\n");
        assert_eq!(parse_head(&stdout), Some(SHA.to_string()));
    }

    #[test]
    fn ignores_other_refs() {
        let stdout = format!("{SHA}\trefs/heads/main\n");
        assert_eq!(parse_head(&stdout), None);
    }

    #[test]
    fn empty_output_has_no_head() {
        assert_eq!(parse_head(""), None);
    }

    #[test]
    fn rejects_malformed_hash() {
        assert_eq!(parse_head("not-a-hash\tHEAD\n"), None);
    }

    #[test]
    fn clamps_clone_depth() {
        assert_eq!(GitCli::new().with_clone_depth(0).clone_depth(), 1);
        assert_eq!(GitCli::new().clone_depth(), DEFAULT_CLONE_DEPTH);
    }
}
