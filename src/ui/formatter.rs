//! Formatting functions for UI output.
//!
//! This module contains all display logic separated from user interaction.
//! Line builders return strings so they can be tested; `display_*` functions
//! only print them.

use console::style;

use crate::domain::Identity;
use crate::git::{CommitInfo, RemoteInfo};
use crate::review::ReviewSession;
use crate::warning::Warning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &Warning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Menu lines of the review screen
pub fn review_menu(allow_regenerate: bool) -> Vec<&'static str> {
    let mut menu = vec!["1) Commit & push", "2) Edit identity", "3) Edit message", "4) Cancel"];
    if allow_regenerate {
        menu.push("5) Change model & regenerate");
    }
    menu
}

/// Display the pending release and the review menu.
pub fn display_review(session: &ReviewSession, allow_regenerate: bool) {
    println!("\n{} {}", style("Identity:").bold(), session.identity);
    println!("{} {}", style("Version:").bold(), style(&session.version).green());
    if let Some(model) = &session.model {
        println!("{}   {}", style("Model:").bold(), model.label);
    }
    println!("\n{}\n{}\n", style("Message:").bold(), session.draft.message());
    for line in review_menu(allow_regenerate) {
        println!("{}", line);
    }
}

/// Repository overview shown when there is nothing to release
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub identity: Option<Identity>,
    pub saved_model: Option<String>,
    pub branch: Option<String>,
    pub latest_tag: Option<String>,
    pub remotes: Vec<RemoteInfo>,
    pub status: Vec<String>,
    pub recent_commits: Vec<CommitInfo>,
}

fn or_unset(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("(not set)")
}

/// One dashboard row per commit: `hash | date | summary`
pub fn format_commit_line(commit: &CommitInfo) -> String {
    format!("{} | {} | {}", commit.hash, commit.date, commit.summary)
}

impl Dashboard {
    /// Dashboard text, one entry per line, without colour
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push("Identity".to_string());
        let (name, email, source) = match &self.identity {
            Some(id) => (Some(id.name.as_str()), Some(id.email.as_str()), id.source.to_string()),
            None => (None, None, "none".to_string()),
        };
        lines.push(format!("  Name   : {}", or_unset(name)));
        lines.push(format!("  Email  : {}", or_unset(email)));
        lines.push(format!("  Source : {}", source));
        lines.push(format!("  Model  : {}", or_unset(self.saved_model.as_deref())));

        lines.push("Repository".to_string());
        lines.push(format!(
            "  Branch : {}",
            self.branch.as_deref().unwrap_or("(detached)")
        ));
        lines.push(format!(
            "  Tag    : {}",
            self.latest_tag.as_deref().unwrap_or("(none)")
        ));

        lines.push("Remotes".to_string());
        if self.remotes.is_empty() {
            lines.push("  (none)".to_string());
        }
        for remote in &self.remotes {
            lines.push(format!("  {} -> {}", remote.name, remote.url));
        }

        lines.push("Status".to_string());
        if self.status.is_empty() {
            lines.push("  ✔ Clean".to_string());
        }
        for entry in &self.status {
            lines.push(format!("  {}", entry));
        }

        lines.push("Recent commits".to_string());
        if self.recent_commits.is_empty() {
            lines.push("  (no commits yet)".to_string());
        }
        for commit in &self.recent_commits {
            lines.push(format!("  {}", format_commit_line(commit)));
        }
        lines
    }
}

/// Display the repository dashboard; section headings in bold cyan.
pub fn display_dashboard(dashboard: &Dashboard) {
    println!();
    for line in dashboard.lines() {
        if line.starts_with(' ') {
            println!("{}", line);
        } else {
            println!("{}", style(line).cyan().bold());
        }
    }
}

/// Explain a failed push and the commands that finish the release by hand.
pub fn display_push_failure(reason: &str, commands: &[String]) {
    display_error(&format!("Push failed: {}", reason));
    println!("{}", style("Your commit and tag are safe locally.").cyan());
    println!("Resolve authentication or permissions, then run:");
    for command in commands {
        println!("  {}", style(command).dim());
    }
}

/// Commands that push `branch` and `tag` by hand
pub fn manual_push_commands(remote: &str, branch: &str, tag: &str) -> [String; 2] {
    [
        format!("git push -u {} {}", remote, branch),
        format!("git push {} {}", remote, tag),
    ]
}

/// Tell the user how to add the missing remote later.
pub fn display_add_remote_hint(remote: &str) {
    println!("{}", style("Add a remote later using:").cyan());
    println!("  {}", style(format!("git remote add {} <url>", remote)).dim());
}
