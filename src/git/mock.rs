use crate::domain::Identity;
use crate::error::{GupError, Result};
use crate::git::{CommitInfo, ConfigScope, ConfigStore, RemoteInfo, Repository};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// A commit recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommit {
    pub identity: Identity,
    pub message: String,
}

/// Mock repository for testing without actual git operations
///
/// Writes (staging, commits, tags, remotes, pushes) are recorded so tests can
/// inspect what the pipeline did.
#[derive(Debug, Default)]
pub struct MockRepository {
    has_commits: bool,
    changes: Vec<String>,
    diff: String,
    latest_tag: Option<String>,
    branch: Option<String>,
    reachable_urls: Vec<String>,
    push_error: Option<String>,
    staged: RefCell<Vec<String>>,
    tags: RefCell<BTreeSet<String>>,
    remotes: RefCell<Vec<RemoteInfo>>,
    commits: RefCell<Vec<RecordedCommit>>,
    annotations: RefCell<Vec<(String, String)>>,
    pushes: RefCell<Vec<String>>,
}

impl MockRepository {
    /// Create a new empty mock repository (no commits, clean tree)
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the repository as having at least one commit
    pub fn with_commits(mut self) -> Self {
        self.has_commits = true;
        self
    }

    /// Add unstaged working-tree changes
    pub fn with_changes(mut self, paths: &[&str]) -> Self {
        self.changes.extend(paths.iter().map(|p| p.to_string()));
        self
    }

    /// Staged diff text
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = diff.into();
        self
    }

    /// Add an existing tag
    pub fn with_tag(self, name: &str) -> Self {
        self.tags.borrow_mut().insert(name.to_string());
        self
    }

    /// Tag reported as the latest reachable one (also added as existing)
    pub fn with_latest_tag(mut self, name: &str) -> Self {
        self.latest_tag = Some(name.to_string());
        self.with_tag(name)
    }

    /// Set the checked-out branch
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    /// Add a configured remote
    pub fn with_remote(self, name: &str, url: &str) -> Self {
        self.remotes.borrow_mut().push(RemoteInfo {
            name: name.to_string(),
            url: url.to_string(),
        });
        self
    }

    /// Make `url` pass the reachability probe
    pub fn with_reachable_url(mut self, url: &str) -> Self {
        self.reachable_urls.push(url.to_string());
        self
    }

    /// Make every push fail with `reason`
    pub fn with_push_error(mut self, reason: &str) -> Self {
        self.push_error = Some(reason.to_string());
        self
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.commits.borrow().clone()
    }

    /// Annotated tags created, as `(name, message)`
    pub fn annotated_tags(&self) -> Vec<(String, String)> {
        self.annotations.borrow().clone()
    }

    /// Refs pushed, as `remote ref`
    pub fn pushes(&self) -> Vec<String> {
        self.pushes.borrow().clone()
    }

    fn push(&self, remote: &str, refname: String) -> Result<()> {
        if let Some(reason) = &self.push_error {
            return Err(GupError::remote(reason.clone()));
        }
        if !self.remotes.borrow().iter().any(|r| r.name == remote) {
            return Err(GupError::remote(format!("Cannot find remote '{}'", remote)));
        }
        self.pushes.borrow_mut().push(format!("{} {}", remote, refname));
        Ok(())
    }
}

impl Repository for MockRepository {
    fn has_commits(&self) -> Result<bool> {
        Ok(self.has_commits || !self.commits.borrow().is_empty())
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.changes.is_empty() && self.staged.borrow().is_empty())
    }

    fn status_lines(&self) -> Result<Vec<String>> {
        Ok(self.changes.iter().map(|p| format!(" M {}", p)).collect())
    }

    fn stage_all(&self) -> Result<()> {
        *self.staged.borrow_mut() = self.changes.clone();
        Ok(())
    }

    fn staged_files(&self) -> Result<Vec<String>> {
        Ok(self.staged.borrow().clone())
    }

    fn staged_diff(&self, limit: usize) -> Result<String> {
        Ok(crate::domain::message::truncate_to_bytes(&self.diff, limit).to_string())
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        Ok(self.latest_tag.clone())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.borrow().contains(name))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn remotes(&self) -> Result<Vec<RemoteInfo>> {
        Ok(self.remotes.borrow().clone())
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        let mut remotes = self.remotes.borrow_mut();
        if remotes.iter().any(|r| r.name == name) {
            return Err(GupError::remote(format!("remote '{}' already exists", name)));
        }
        remotes.push(RemoteInfo {
            name: name.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn probe_remote(&self, url: &str, _timeout: Duration) -> Result<()> {
        if self.reachable_urls.iter().any(|u| u == url) {
            Ok(())
        } else {
            Err(GupError::remote("Git could not access this repository URL."))
        }
    }

    fn commit(&self, identity: &Identity, message: &str) -> Result<String> {
        let mut commits = self.commits.borrow_mut();
        commits.push(RecordedCommit {
            identity: identity.clone(),
            message: message.to_string(),
        });
        self.staged.borrow_mut().clear();
        Ok(format!("{:040x}", commits.len()))
    }

    fn create_annotated_tag(&self, name: &str, _identity: &Identity, message: &str) -> Result<()> {
        if !self.tags.borrow_mut().insert(name.to_string()) {
            return Err(GupError::tag(format!("tag '{}' already exists", name)));
        }
        self.annotations
            .borrow_mut()
            .push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.push(remote, format!("refs/heads/{}", branch))
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.push(remote, format!("refs/tags/{}", tag))
    }

    fn recent_commits(&self, count: usize) -> Result<Vec<CommitInfo>> {
        Ok(self
            .commits
            .borrow()
            .iter()
            .rev()
            .take(count)
            .enumerate()
            .map(|(i, c)| CommitInfo {
                hash: format!("{:07x}", i + 1),
                date: "2024-01-01".to_string(),
                summary: c.message.lines().next().unwrap_or_default().to_string(),
            })
            .collect())
    }
}

/// In-memory [ConfigStore]
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<(ConfigScope, String), String>,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`
    pub fn with(mut self, scope: ConfigScope, key: &str, value: &str) -> Self {
        self.values.insert((scope, key.to_string()), value.to_string());
        self
    }
}

impl ConfigStore for MemoryConfig {
    fn get(&self, scope: ConfigScope, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .get(&(scope, key.to_string()))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    fn set(&mut self, scope: ConfigScope, key: &str, value: &str) -> Result<()> {
        self.values.insert((scope, key.to_string()), value.to_string());
        Ok(())
    }
}
