//! Git operations abstraction layer
//!
//! This module provides trait-based abstractions over the two things the
//! release pipeline needs from git: the repository itself and git's scoped
//! key-value configuration store.
//!
//! # Overview
//!
//! - [Repository]: status, staging, diffing, tags, commits, remotes and pushes
//! - [ConfigStore]: `get`/`set` on local or global git configuration
//!
//! The concrete implementations include:
//!
//! - [repository::Git2Repository] and [config_store::GitConfigStore]: real
//!   implementations using the `git2` crate
//! - [mock::MockRepository] and [mock::MemoryConfig]: in-memory
//!   implementations for testing
//!
//! Pipeline code depends on the traits only, so it can be exercised without
//! touching a real repository.

pub mod config_store;
pub mod mock;
pub mod repository;

pub use config_store::GitConfigStore;
pub use mock::{MemoryConfig, MockRepository};
pub use repository::Git2Repository;

use crate::domain::Identity;
use crate::error::{GupError, ProcessError, Result};
use crate::process::run_with_timeout;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Summary of a commit for display
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The abbreviated commit hash
    pub hash: String,
    /// Commit date as `YYYY-MM-DD` in the committer's offset
    pub date: String,
    /// First line of the commit message
    pub summary: String,
}

/// A configured remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub name: String,
    pub url: String,
}

/// Git operations used by the release pipeline
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Probes whose failure is itself
/// the answer (no tags yet, detached HEAD, unborn branch) return `Ok(None)` or
/// `Ok(false)` instead of an error.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation
pub trait Repository {
    /// Whether HEAD points at a commit (false in a freshly initialised repository)
    fn has_commits(&self) -> Result<bool>;

    /// Whether the working tree and index have no changes, untracked files included
    fn is_clean(&self) -> Result<bool>;

    /// Short status lines (`XY path`), one per changed path
    fn status_lines(&self) -> Result<Vec<String>>;

    /// Stage every working-tree change: new, modified and deleted files
    fn stage_all(&self) -> Result<()>;

    /// Paths that differ between HEAD (or the empty tree) and the index
    fn staged_files(&self) -> Result<Vec<String>>;

    /// Staged diff without context lines, read up to `limit` bytes
    fn staged_diff(&self, limit: usize) -> Result<String>;

    /// Most recent tag reachable from HEAD, if any
    fn latest_tag(&self) -> Result<Option<String>>;

    /// Whether a tag with this exact name exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Name of the checked-out branch; `None` when HEAD is detached
    fn current_branch(&self) -> Result<Option<String>>;

    /// All configured remotes with their URLs
    fn remotes(&self) -> Result<Vec<RemoteInfo>>;

    /// Add a remote
    fn add_remote(&self, name: &str, url: &str) -> Result<()>;

    /// Check that `url` can be reached, within `timeout`
    fn probe_remote(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Commit the index with `identity` as both author and committer
    ///
    /// Returns the new commit's id.
    fn commit(&self, identity: &Identity, message: &str) -> Result<String>;

    /// Create an annotated tag on HEAD
    fn create_annotated_tag(&self, name: &str, identity: &Identity, message: &str) -> Result<()>;

    /// Push a local branch and record it as the branch's upstream
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push a single tag
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// The most recent `count` commits reachable from HEAD, newest first
    fn recent_commits(&self, count: usize) -> Result<Vec<CommitInfo>>;
}

/// Which git configuration file a key is read from or written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigScope {
    /// The repository's own `.git/config`
    Local,
    /// The user's global configuration
    Global,
}

/// Scoped key-value access to git configuration
///
/// Empty values are reported as absent.
pub trait ConfigStore {
    fn get(&self, scope: ConfigScope, key: &str) -> Result<Option<String>>;

    fn set(&mut self, scope: ConfigScope, key: &str, value: &str) -> Result<()>;

    /// Local value if present, otherwise the global one
    fn get_effective(&self, key: &str) -> Result<Option<String>> {
        match self.get(ConfigScope::Local, key)? {
            Some(value) => Ok(Some(value)),
            None => self.get(ConfigScope::Global, key),
        }
    }
}

/// Git config key holding the last selected model
pub const MODEL_KEY: &str = "gup.model";

/// Git config key holding the generation timeout in seconds
pub const TIMEOUT_KEY: &str = "gup.timeout";

/// Probe a remote URL with `git ls-remote`, bounded by `timeout`
///
/// Terminal credential prompts are disabled so an unauthenticated URL fails
/// instead of waiting for input.
pub fn probe_remote_url(url: &str, timeout: Duration) -> Result<()> {
    let mut command = Command::new("git");
    command
        .args(["ls-remote", "--quiet", url])
        .env("GIT_TERMINAL_PROMPT", "0");

    debug!(url, "probing remote");
    match run_with_timeout(command, timeout) {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => {
            debug!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ls-remote failed"
            );
            Err(GupError::remote("Git could not access this repository URL."))
        }
        Err(ProcessError::Timeout(_)) => Err(GupError::remote(
            "Connection timed out while contacting the remote.",
        )),
        Err(e) => Err(GupError::remote(format!("Could not run git: {}", e))),
    }
}
