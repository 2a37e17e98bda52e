use crate::domain::Identity;
use crate::error::{GupError, Result};
use crate::git::{probe_remote_url, CommitInfo, GitConfigStore, RemoteInfo};
use chrono::{DateTime, FixedOffset};
use git2::{
    BranchType, Commit, Cred, CredentialType, DescribeFormatOptions, DescribeOptions, Diff,
    DiffFormat, DiffOptions, ErrorCode, IndexAddOption, ObjectType, PushOptions,
    RemoteCallbacks, Repository as Git2Repo, Signature, Sort, Status, StatusOptions,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Credential callbacks give up after this many attempts; libgit2 would
/// otherwise keep asking forever when a credential is rejected.
const MAX_CREDENTIAL_ATTEMPTS: usize = 4;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Discover the repository containing `path`
    ///
    /// Bare repositories and paths outside any repository are reported as
    /// [GupError::NotARepository].
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path).map_err(|e| {
            debug!(error = %e, "repository discovery failed");
            GupError::NotARepository
        })?;
        if repo.is_bare() {
            return Err(GupError::NotARepository);
        }
        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Configuration store backed by this repository's config levels
    pub fn config_store(&self) -> Result<GitConfigStore> {
        Ok(GitConfigStore::new(self.repo.config()?))
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn staged(&self, context_lines: u32) -> Result<Diff<'_>> {
        let head_tree = match self.head_commit()? {
            Some(commit) => Some(commit.tree()?),
            None => None,
        };
        let index = self.repo.index()?;
        let mut opts = DiffOptions::new();
        opts.context_lines(context_lines);

        Ok(self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), Some(&mut opts))?)
    }

    fn signature(identity: &Identity) -> Result<Signature<'static>> {
        Signature::now(&identity.name, &identity.email).map_err(|e| {
            GupError::commit(format!(
                "Invalid identity '{} <{}>': {}",
                identity.name,
                identity.email,
                e.message()
            ))
        })
    }

    fn push_refspec(&self, remote_name: &str, refspec: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            GupError::remote(format!("Cannot find remote '{}': {}", remote_name, e.message()))
        })?;

        let config = self.repo.config()?;
        let mut attempts = 0;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |url, username_from_url, allowed_types| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }
            credentials(&config, url, username_from_url, allowed_types)
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(message) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, message
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        info!(remote = remote_name, refspec, "pushing");
        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    GupError::remote(format!("Network error during push: {}", e.message()))
                } else {
                    GupError::remote(format!("Push to '{}' failed: {}", remote_name, e.message()))
                }
            })
    }
}

/// Credentials for push: SSH keys from ~/.ssh, then the SSH agent, then git's
/// credential helpers, then libgit2 defaults
fn credentials(
    config: &git2::Config,
    url: &str,
    username_from_url: Option<&str>,
    allowed_types: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    let username = username_from_url.unwrap_or("git");

    if allowed_types.contains(CredentialType::SSH_KEY) {
        if let Some(home) = dirs::home_dir() {
            for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                let path = home.join(".ssh").join(key);
                if path.exists() {
                    if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                        return Ok(cred);
                    }
                }
            }
        }
        if let Ok(cred) = Cred::ssh_key_from_agent(username) {
            return Ok(cred);
        }
    }

    if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
        if let Ok(cred) = Cred::credential_helper(config, url, username_from_url) {
            return Ok(cred);
        }
    }

    if allowed_types.contains(CredentialType::USERNAME) {
        return Cred::username(username);
    }

    Cred::default()
}

/// Two-letter short status code, as `git status --short` prints it
fn short_status(status: Status) -> String {
    if status.contains(Status::WT_NEW) && !status.intersects(index_flags()) {
        return "??".to_string();
    }
    if status.contains(Status::CONFLICTED) {
        return "UU".to_string();
    }

    let index = if status.contains(Status::INDEX_NEW) {
        'A'
    } else if status.contains(Status::INDEX_MODIFIED) {
        'M'
    } else if status.contains(Status::INDEX_DELETED) {
        'D'
    } else if status.contains(Status::INDEX_RENAMED) {
        'R'
    } else if status.contains(Status::INDEX_TYPECHANGE) {
        'T'
    } else {
        ' '
    };
    let worktree = if status.contains(Status::WT_MODIFIED) {
        'M'
    } else if status.contains(Status::WT_DELETED) {
        'D'
    } else if status.contains(Status::WT_RENAMED) {
        'R'
    } else if status.contains(Status::WT_TYPECHANGE) {
        'T'
    } else {
        ' '
    };
    format!("{}{}", index, worktree)
}

fn index_flags() -> Status {
    Status::INDEX_NEW
        | Status::INDEX_MODIFIED
        | Status::INDEX_DELETED
        | Status::INDEX_RENAMED
        | Status::INDEX_TYPECHANGE
}

impl super::Repository for Git2Repository {
    fn has_commits(&self) -> Result<bool> {
        Ok(self.head_commit()?.is_some())
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.status_lines()?.is_empty())
    }

    fn status_lines(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status() != Status::CURRENT)
            .map(|entry| {
                format!(
                    "{} {}",
                    short_status(entry.status()),
                    entry.path().unwrap_or("(non-utf8 path)")
                )
            })
            .collect())
    }

    fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        debug!(entries = index.len(), "staged working tree");
        Ok(())
    }

    fn staged_files(&self) -> Result<Vec<String>> {
        let diff = self.staged(0)?;
        Ok(diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().into_owned())
            .collect())
    }

    fn staged_diff(&self, limit: usize) -> Result<String> {
        let diff = self.staged(0)?;
        let mut patch = Vec::new();

        let printed = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin() as u8);
            }
            patch.extend_from_slice(line.content());
            patch.len() < limit
        });
        // Stopping the callback early surfaces as an error; only a real
        // failure before the limit is reported.
        if let Err(e) = printed {
            if patch.len() < limit {
                return Err(e.into());
            }
        }

        let text = String::from_utf8_lossy(&patch);
        Ok(crate::domain::message::truncate_to_bytes(&text, limit).to_string())
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        if self.head_commit()?.is_none() {
            return Ok(None);
        }
        let mut opts = DescribeOptions::new();
        opts.describe_tags();

        match self.repo.describe(&opts) {
            Ok(description) => {
                let mut format = DescribeFormatOptions::new();
                format.abbreviated_size(0);
                Ok(Some(description.format(Some(&format))?))
            }
            // libgit2 reports "no reference found" with a generic code, so any
            // describe failure means there is no usable tag
            Err(e) => {
                debug!(error = %e.message(), "no tag reachable from HEAD");
                Ok(None)
            }
        }
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(GupError::tag(format!(
                "Cannot look up tag '{}': {}",
                name,
                e.message()
            ))),
        }
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string))
    }

    fn remotes(&self) -> Result<Vec<RemoteInfo>> {
        let names = self.repo.remotes()?;
        let mut remotes = Vec::new();
        for name in names.iter().flatten() {
            let remote = self.repo.find_remote(name)?;
            remotes.push(RemoteInfo {
                name: name.to_string(),
                url: remote.url().unwrap_or_default().to_string(),
            });
        }

        // "origin" first, then alphabetical
        remotes.sort_by(|a, b| {
            (a.name != "origin")
                .cmp(&(b.name != "origin"))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(remotes)
    }

    fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.repo.remote(name, url).map_err(|e| {
            GupError::remote(format!("Cannot add remote '{}': {}", name, e.message()))
        })?;
        info!(name, url, "added remote");
        Ok(())
    }

    fn probe_remote(&self, url: &str, timeout: Duration) -> Result<()> {
        probe_remote_url(url, timeout)
    }

    fn commit(&self, identity: &Identity, message: &str) -> Result<String> {
        let signature = Self::signature(identity)?;
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let parent = self.head_commit()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|e| GupError::commit(e.message().to_string()))?;
        info!(commit = %oid, "created commit");
        Ok(oid.to_string())
    }

    fn create_annotated_tag(&self, name: &str, identity: &Identity, message: &str) -> Result<()> {
        let tagger = Self::signature(identity)?;
        let target = self.repo.head()?.peel(ObjectType::Commit)?;

        self.repo
            .tag(name, &target, &tagger, message, false)
            .map_err(|e| GupError::tag(format!("Cannot create tag '{}': {}", name, e.message())))?;
        info!(tag = name, "created annotated tag");
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        self.push_refspec(remote, &refspec)?;

        let upstream = format!("{}/{}", remote, branch);
        let mut local = self.repo.find_branch(branch, BranchType::Local)?;
        if let Err(e) = local.set_upstream(Some(&upstream)) {
            warn!(branch, upstream = %upstream, error = %e, "could not set upstream");
        }
        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let refspec = format!("refs/tags/{0}:refs/tags/{0}", tag);
        self.push_refspec(remote, &refspec)
    }

    fn recent_commits(&self, count: usize) -> Result<Vec<CommitInfo>> {
        let Some(head) = self.head_commit()? else {
            return Ok(Vec::new());
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head.id())?;
        revwalk.set_sorting(Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk.take(count) {
            let commit = self.repo.find_commit(oid?)?;
            let time = commit.time();
            let date = FixedOffset::east_opt(time.offset_minutes() * 60)
                .and_then(|offset| {
                    DateTime::from_timestamp(time.seconds(), 0).map(|dt| dt.with_timezone(&offset))
                })
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default();

            commits.push(CommitInfo {
                hash: commit.id().to_string()[..7].to_string(),
                date,
                summary: commit.summary().unwrap_or("(empty message)").to_string(),
            });
        }
        Ok(commits)
    }
}
