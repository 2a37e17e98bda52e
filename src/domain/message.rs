//! Commit message rules: fallback summaries, the summary-line limit and the
//! draft passed through review.

/// Maximum length of a commit summary line, in characters.
pub const SUMMARY_LIMIT: usize = 72;

/// Maximum number of staged-diff bytes sent to the text generator.
pub const DIFF_BYTE_LIMIT: usize = 15_000;

/// Summary used for the very first commit of a repository.
pub const BOOTSTRAP_MESSAGE: &str = "Initial commit";

/// Summary used when exactly one file is staged.
pub const SINGLE_FILE_MESSAGE: &str = "Update project configuration";

/// Deterministic summary derived from the number of staged files.
pub fn fallback_summary(file_count: usize, bootstrap: bool) -> String {
    if bootstrap {
        BOOTSTRAP_MESSAGE.to_string()
    } else if file_count == 1 {
        SINGLE_FILE_MESSAGE.to_string()
    } else if file_count <= 5 {
        format!("Update {} project files", file_count)
    } else {
        format!("Update multiple project files ({})", file_count)
    }
}

/// Keep the first line of `message` within [`SUMMARY_LIMIT`] characters.
///
/// A conforming message is returned byte-for-byte. An overlong summary is cut
/// at the limit and then back to its last space, if it has one; the remaining
/// lines are kept as they are.
pub fn enforce_summary_limit(message: &str) -> String {
    enforce_summary_limit_to(message, SUMMARY_LIMIT)
}

/// [`enforce_summary_limit`] with an explicit limit.
pub fn enforce_summary_limit_to(message: &str, limit: usize) -> String {
    let mut lines: Vec<&str> = message.trim().lines().collect();
    let Some(summary) = lines.first().copied() else {
        return message.to_string();
    };
    if summary.chars().count() <= limit {
        return message.to_string();
    }

    let cut_at = summary
        .char_indices()
        .nth(limit)
        .map_or(summary.len(), |(idx, _)| idx);
    let mut cut = &summary[..cut_at];
    if let Some(space) = cut.rfind(' ') {
        cut = &cut[..space];
    }
    lines[0] = cut;
    lines.join("\n")
}

/// Longest prefix of `text` that fits in `limit` bytes without splitting a character.
pub fn truncate_to_bytes(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Prompt asking the text generator to improve `current` given the staged diff.
pub fn build_prompt(current: &str, diff: &str) -> String {
    format!(
        "Improve this Git commit message.\n\
         \n\
         Rules:\n\
         - FIRST line ≤ {limit} characters.\n\
         - Do NOT invent details.\n\
         - Reply with the commit message only.\n\
         \n\
         Current message:\n\
         {current}\n\
         \n\
         Diff:\n\
         {diff}\n",
        limit = SUMMARY_LIMIT,
        current = current,
        diff = truncate_to_bytes(diff, DIFF_BYTE_LIMIT),
    )
}

/// Commit message under review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDraft {
    /// First line, never longer than [`SUMMARY_LIMIT`] characters
    pub summary: String,
    /// Everything after the summary line, verbatim; possibly empty
    pub body: String,
    /// Model that produced the text, if any
    pub model_id: Option<String>,
    /// Why generation fell back to the default text, if it did
    pub warning: Option<String>,
}

impl CommitDraft {
    /// Normalize `message` and split it into summary and body
    pub fn from_message(message: &str) -> Self {
        let normalized = enforce_summary_limit(message.trim());
        let (summary, body) = normalized.split_once('\n').unwrap_or((&normalized, ""));
        let (summary, body) = (summary.to_string(), body.to_string());

        CommitDraft {
            summary,
            body,
            model_id: None,
            warning: None,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Full message text as it will be committed (before version trailers)
    pub fn message(&self) -> String {
        if self.body.is_empty() {
            self.summary.clone()
        } else {
            format!("{}\n{}", self.summary, self.body)
        }
    }
}
