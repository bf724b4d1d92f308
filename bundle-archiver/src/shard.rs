//! Deterministic storage keys for repository bundles.
//!
//! A repository named `foo` with id `7` is stored at `f/o/o/7.bundle`: one
//! directory level per character of the name, terminated by an id-named
//! bundle file. This keeps object-storage listings shallow, and the id makes
//! the key unique even when two names collapse to the same segments after
//! escaping.

use std::fmt;
use std::path::{Path, PathBuf};

/// Replacement for characters that are unsafe in a key or local path.
const SAFE_SUBSTITUTE: char = '-';

/// Placeholder segment used when the repository name is empty.
const EMPTY_NAME_SEGMENT: &str = "_";

/// File extension of a staged bundle.
const BUNDLE_EXTENSION: &str = "bundle";

/// An ordered sequence of path segments identifying a stored bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardedKey {
    segments: Vec<String>,
}

impl ShardedKey {
    /// Returns the individual path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the first segment, the top directory of the staged tree.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Returns the terminal `<id>.bundle` segment.
    pub fn file_name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Returns the object-storage key (segments joined with `/`).
    ///
    /// The key never starts with `./`, which some S3 implementations reject
    /// when computing request signatures.
    pub fn key(&self) -> String {
        self.segments.join("/")
    }

    /// Returns the local path of the staged bundle below `base`.
    pub fn local_path(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for ShardedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Maps a repository name and id to its sharded storage key.
///
/// Every character of `name` becomes its own segment, with unsafe characters
/// replaced by `-`. The final segment is `"<id>.bundle"`.
///
/// # Examples
///
/// ```
/// use bundle_archiver::shard;
///
/// let key = shard("foo", 7);
/// assert_eq!(key.key(), "f/o/o/7.bundle");
/// assert_eq!(key.root(), "f");
///
/// assert_eq!(shard("a.b", 1).key(), "a/-/b/1.bundle");
/// ```
pub fn shard(name: &str, id: i64) -> ShardedKey {
    let mut segments: Vec<String> = name
        .chars()
        .map(|c| {
            if is_unsafe(c) {
                SAFE_SUBSTITUTE.to_string()
            } else {
                c.to_string()
            }
        })
        .collect();

    if segments.is_empty() {
        segments.push(EMPTY_NAME_SEGMENT.to_string());
    }

    segments.push(format!("{id}.{BUNDLE_EXTENSION}"));
    ShardedKey { segments }
}

/// Characters that cannot appear as a single-character key or path segment.
fn is_unsafe(c: char) -> bool {
    matches!(
        c,
        '.' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'
    ) || c.is_whitespace()
        || c.is_control()
}
