//! Review loop: show the pending release and let the user commit, edit or cancel
//!
//! The loop is a small state machine. [transition] is pure; [run_review]
//! drives it with terminal input and performs the edits.

use tracing::debug;

use crate::compose::Composer;
use crate::domain::identity::{prompt_identity, save_identity};
use crate::domain::{CommitDraft, Identity, Version};
use crate::error::Result;
use crate::git::ConfigStore;
use crate::llm::{ModelInfo, TextGenerator};
use crate::ui::{self, Prompter};
use crate::warning::Warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Reviewing,
    EditingIdentity,
    EditingMessage,
    RegeneratingMessage,
    Proceeding,
    Cancelled,
}

impl ReviewState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReviewState::Proceeding | ReviewState::Cancelled)
    }
}

/// Menu entries, numbered as shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewChoice {
    Commit,
    EditIdentity,
    EditMessage,
    Cancel,
    Regenerate,
}

impl ReviewChoice {
    /// Choice for a menu key; `5` only counts when regeneration is offered
    pub fn parse(input: &str, allow_regenerate: bool) -> Option<Self> {
        match input.trim() {
            "1" => Some(ReviewChoice::Commit),
            "2" => Some(ReviewChoice::EditIdentity),
            "3" => Some(ReviewChoice::EditMessage),
            "4" => Some(ReviewChoice::Cancel),
            "5" if allow_regenerate => Some(ReviewChoice::Regenerate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewInput {
    Choice(ReviewChoice),
    /// Unrecognised menu input
    Invalid,
    /// The current edit finished
    Done,
}

impl ReviewInput {
    pub fn from_menu(input: &str, allow_regenerate: bool) -> Self {
        ReviewChoice::parse(input, allow_regenerate).map_or(ReviewInput::Invalid, ReviewInput::Choice)
    }
}

pub fn transition(state: ReviewState, input: ReviewInput) -> ReviewState {
    use ReviewState::*;

    match (state, input) {
        (Reviewing, ReviewInput::Choice(choice)) => match choice {
            ReviewChoice::Commit => Proceeding,
            ReviewChoice::EditIdentity => EditingIdentity,
            ReviewChoice::EditMessage => EditingMessage,
            ReviewChoice::Cancel => Cancelled,
            ReviewChoice::Regenerate => RegeneratingMessage,
        },
        (Reviewing, _) => Reviewing,
        (EditingIdentity | EditingMessage | RegeneratingMessage, ReviewInput::Done) => Reviewing,
        (state, _) => state,
    }
}

/// Everything shown on the review screen
#[derive(Debug, Clone)]
pub struct ReviewSession {
    pub identity: Identity,
    pub version: Version,
    pub model: Option<ModelInfo>,
    pub draft: CommitDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Proceed,
    Cancel,
}

/// Run the review loop until the user commits or cancels
///
/// Regeneration is offered only when `composer` is present.
pub fn run_review<C, G, P>(
    session: &mut ReviewSession,
    config: &mut C,
    composer: Option<&Composer<'_, G>>,
    prompter: &mut P,
) -> Result<ReviewOutcome>
where
    C: ConfigStore + ?Sized,
    G: TextGenerator + ?Sized,
    P: Prompter + ?Sized,
{
    let allow_regenerate = composer.is_some();
    let mut state = ReviewState::Reviewing;

    loop {
        let input = match state {
            ReviewState::Reviewing => {
                ui::display_review(session, allow_regenerate);
                let answer = prompter.ask("Choice: ")?;
                ReviewInput::from_menu(&answer, allow_regenerate)
            }
            ReviewState::EditingIdentity => {
                let (name, email) =
                    prompt_identity(prompter, &session.identity.name, &session.identity.email)?;
                session.identity = save_identity(config, &name, &email)?;
                ReviewInput::Done
            }
            ReviewState::EditingMessage => {
                let text = prompter.ask_block("Enter message (Ctrl+D to finish):")?;
                if text.trim().is_empty() {
                    debug!("empty message entered, keeping current one");
                } else {
                    session.draft = CommitDraft::from_message(text.trim());
                }
                ReviewInput::Done
            }
            ReviewState::RegeneratingMessage => {
                if let Some(composer) = composer {
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
                ReviewInput::Done
            }
            ReviewState::Proceeding => return Ok(ReviewOutcome::Proceed),
            ReviewState::Cancelled => return Ok(ReviewOutcome::Cancel),
        };

        let next = transition(state, input);
        debug!(from = ?state, to = ?next, "review transition");
        state = next;
    }
}
