//! Main release workflow
//!
//! [run_pipeline] runs one release from precheck to push. It only talks to
//! git, configuration, the generator and the terminal through traits, so the
//! whole workflow can be driven by mocks.

use std::time::Duration;

use chrono::Local;
use tracing::{debug, info};

use crate::compose::Composer;
use crate::config::Settings;
use crate::domain::identity::{read_identity, resolve_identity};
use crate::domain::message::{fallback_summary, DIFF_BYTE_LIMIT};
use crate::domain::{CommitDraft, Version};
use crate::error::{GupError, Result};
use crate::git::{ConfigStore, Repository, MODEL_KEY, TIMEOUT_KEY};
use crate::llm::{clamp_timeout, TextGenerator};
use crate::review::{run_review, ReviewOutcome, ReviewSession};
use crate::ui::{self, Dashboard, Prompter};
use crate::warning::Warning;

/// Which front end is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Model selection, generated messages, dashboard on no-op exits
    Gup,
    /// Hand-written message, no generator
    Gitgo,
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Committed, tagged and pushed
    Released { tag: String },
    /// Committed and tagged; no remote to push to
    LocalOnly { tag: String },
    /// Working tree already clean
    NothingToCommit,
    /// Staging produced no changes
    NoStagedChanges,
    /// User cancelled during review
    Cancelled,
    /// Commit and tag exist locally but the push failed; `commands` finish it by hand
    PushFailed {
        tag: String,
        branch: String,
        commands: [String; 2],
    },
    /// The entered remote URL could not be reached; nothing committed
    RemoteRejected { url: String },
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::PushFailed { .. } | Outcome::RemoteRejected { .. } => 1,
            _ => 0,
        }
    }
}

/// Commit and tag message: reviewed text plus version and timestamp trailers
pub fn final_message(message: &str, tag: &str, timestamp: &str) -> String {
    format!(
        "{}\n\nVersion: {}\nTimestamp: {}\n",
        message.trim_end(),
        tag,
        timestamp
    )
}

/// Local time as written into the message trailer
pub fn timestamp_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Everything [run_pipeline] works with
pub struct Pipeline<'a, R, C, G, P>
where
    R: Repository + ?Sized,
    C: ConfigStore + ?Sized,
    G: TextGenerator + ?Sized,
    P: Prompter + ?Sized,
{
    pub variant: Variant,
    pub settings: &'a Settings,
    pub repo: &'a R,
    pub config: &'a mut C,
    pub generator: &'a G,
    pub prompter: &'a mut P,
}

/// Run one release
pub fn run_pipeline<R, C, G, P>(pipeline: Pipeline<'_, R, C, G, P>) -> Result<Outcome>
where
    R: Repository + ?Sized,
    C: ConfigStore + ?Sized,
    G: TextGenerator + ?Sized,
    P: Prompter + ?Sized,
{
    let Pipeline {
        variant,
        settings,
        repo,
        config,
        generator,
        prompter,
    } = pipeline;

    let bootstrap = !repo.has_commits()?;
    if !bootstrap && repo.is_clean()? {
        ui::display_status("Nothing to commit.");
        if variant == Variant::Gup {
            ui::display_dashboard(&build_dashboard(repo, &*config)?);
        }
        return Ok(Outcome::NothingToCommit);
    }

    let version = next_release_version(repo, bootstrap)?;
    info!(version = %version, bootstrap, "next release");

    let identity = resolve_identity(&*config, prompter)?;

    repo.stage_all()?;
    let files = repo.staged_files()?;
    if files.is_empty() {
        ui::display_status("No staged changes.");
        if variant == Variant::Gup {
            ui::display_dashboard(&build_dashboard(repo, &*config)?);
        }
        return Ok(Outcome::NoStagedChanges);
    }
    debug!(count = files.len(), "staged files");
    let fallback = fallback_summary(files.len(), bootstrap);

    let composer = match variant {
        Variant::Gup => {
            let diff = repo.staged_diff(DIFF_BYTE_LIMIT)?;
            let raw_timeout = config.get_effective(TIMEOUT_KEY)?;
            let (secs, warning) = clamp_timeout(raw_timeout.as_deref(), settings.timeout_secs);
            if let Some(warning) = warning {
                ui::display_warning(&warning);
            }
            Composer::new(generator, fallback.clone(), diff, Duration::from_secs(secs))
        }
        Variant::Gitgo => None,
    };

    let mut session = ReviewSession {
        identity,
        version,
        model: None,
        draft: CommitDraft::from_message(&fallback),
    };
    match (&composer, variant) {
        (Some(composer), _) => {
            let model = composer.select_model(config, prompter)?;
            session.draft = composer.compose(&model);
            if let Some(reason) = &session.draft.warning {
                ui::display_warning(&Warning::GenerationFailed {
                    model: model.id.clone(),
                    reason: reason.clone(),
                });
            }
            session.model = Some(model);
        }
        (None, Variant::Gitgo) => {
            let typed = prompter.ask("Commit message: ")?;
            if !typed.is_empty() {
                session.draft = CommitDraft::from_message(&typed);
            }
        }
        (None, Variant::Gup) => debug!("no text generator, using fallback message"),
    }

    if run_review(&mut session, config, composer.as_ref(), prompter)? == ReviewOutcome::Cancel {
        ui::display_status("Cancelled.");
        return Ok(Outcome::Cancelled);
    }

    let remote = match resolve_remote(repo, prompter, settings) {
        Ok(remote) => remote,
        Err(RemoteSetupError::Rejected { url, reason }) => {
            ui::display_error(&format!("Remote validation failed. {}", reason));
            ui::display_status("Fix the URL or repository access, then run again.");
            return Ok(Outcome::RemoteRejected { url });
        }
        Err(RemoteSetupError::Other(e)) => return Err(e),
    };

    let tag = session.version.to_string();
    let message = final_message(&session.draft.message(), &tag, &timestamp_now());
    let commit = repo.commit(&session.identity, &message)?;
    repo.create_annotated_tag(&tag, &session.identity, &message)?;
    info!(commit = %commit, tag = %tag, "release committed");

    let Some(remote) = remote else {
        ui::display_success(&format!("Local commit and tag created: {}", tag));
        ui::display_add_remote_hint(&settings.remote);
        return Ok(Outcome::LocalOnly { tag });
    };

    let branch = repo
        .current_branch()?
        .unwrap_or_else(|| settings.default_branch.clone());

    let pushed = repo
        .push_branch(&remote, &branch)
        .and_then(|()| repo.push_tag(&remote, &tag));
    if let Err(e) = pushed {
        let commands = ui::formatter::manual_push_commands(&remote, &branch, &tag);
        ui::display_push_failure(&e.to_string(), &commands);
        return Ok(Outcome::PushFailed {
            tag,
            branch,
            commands,
        });
    }

    ui::display_success(&format!("Released {}", tag));
    Ok(Outcome::Released { tag })
}

/// Next unused tag; a bootstrap release ignores existing tag descriptions
fn next_release_version<R: Repository + ?Sized>(repo: &R, bootstrap: bool) -> Result<Version> {
    let latest = if bootstrap { None } else { repo.latest_tag()? };
    if let Some(tag) = latest.as_deref() {
        if Version::parse_tag(tag).is_none() {
            ui::display_warning(&Warning::UnparsableTag {
                tag: tag.to_string(),
            });
        }
    }

    Version::from_latest_tag(latest.as_deref()).next_free(|name| repo.tag_exists(name))
}

enum RemoteSetupError {
    Rejected { url: String, reason: String },
    Other(GupError),
}

impl From<GupError> for RemoteSetupError {
    fn from(e: GupError) -> Self {
        RemoteSetupError::Other(e)
    }
}

/// Remote to push to, set up interactively when missing
///
/// `Ok(None)` means the user chose to release locally only.
fn resolve_remote<R, P>(
    repo: &R,
    prompter: &mut P,
    settings: &Settings,
) -> std::result::Result<Option<String>, RemoteSetupError>
where
    R: Repository + ?Sized,
    P: Prompter + ?Sized,
{
    let name = settings.remote.as_str();
    if repo.remotes()?.iter().any(|r| r.name == name) {
        return Ok(Some(name.to_string()));
    }

    ui::display_status(&format!("No git remote named '{}' is configured.", name));
    println!("A remote is required to push commits and tags.");
    let url = prompter.ask("Enter remote repository URL (leave blank to skip push): ")?;
    if url.is_empty() {
        return Ok(None);
    }

    let timeout = Duration::from_secs(settings.probe_timeout_secs.max(1));
    if let Err(e) = repo.probe_remote(&url, timeout) {
        let reason = match e {
            GupError::Remote(reason) => reason,
            other => other.to_string(),
        };
        return Err(RemoteSetupError::Rejected { url, reason });
    }

    repo.add_remote(name, &url)?;
    ui::display_success(&format!("Remote '{}' added successfully.", name));
    Ok(Some(name.to_string()))
}

/// Snapshot of the repository for the dashboard
pub fn build_dashboard<R, C>(repo: &R, config: &C) -> Result<Dashboard>
where
    R: Repository + ?Sized,
    C: ConfigStore + ?Sized,
{
    let has_commits = repo.has_commits()?;
    Ok(Dashboard {
        identity: read_identity(config)?,
        saved_model: config.get_effective(MODEL_KEY)?,
        branch: repo.current_branch()?,
        latest_tag: if has_commits { repo.latest_tag()? } else { None },
        remotes: repo.remotes()?,
        status: repo.status_lines()?,
        recent_commits: repo.recent_commits(3)?,
    })
}
