//! Text generation through an external CLI
//!
//! The release pipeline only needs two things from a generator: the list of
//! models it offers and a completion for one prompt. [TextGenerator] captures
//! that; [LlmCli] implements it by running the `llm` executable.

pub mod models;
pub mod subprocess;

pub use models::{parse_models, quick_choices};
pub use subprocess::LlmCli;

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::message::build_prompt;
use crate::domain::CommitDraft;
use crate::error::LlmError;
use crate::warning::Warning;

/// Generation timeout when none is configured, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 60;

/// One model offered by the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Identifier passed back to the generator
    pub id: String,
    /// Full line as the generator lists it
    pub label: String,
}

/// External text generator
pub trait TextGenerator {
    /// Whether the generator can be run at all
    fn is_available(&self) -> bool;

    /// Models the generator offers, in its own order
    fn list_models(&self, timeout: Duration) -> Result<Vec<ModelInfo>, LlmError>;

    /// Completion for `prompt`, bounded by `timeout`
    fn generate(&self, model: &str, prompt: &str, timeout: Duration) -> Result<String, LlmError>;
}

/// Generation timeout from the raw `gup.timeout` value
///
/// Integers are clamped to 1..=60 seconds. A missing value gives `default`
/// (clamped too); a non-integer gives `default` plus a warning.
pub fn clamp_timeout(raw: Option<&str>, default: u64) -> (u64, Option<Warning>) {
    let default = default.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return (default, None);
    };

    match raw.parse::<i64>() {
        Ok(secs) => {
            let secs = secs.clamp(MIN_TIMEOUT_SECS as i64, MAX_TIMEOUT_SECS as i64);
            (secs as u64, None)
        }
        Err(_) => (
            default,
            Some(Warning::InvalidTimeout {
                value: raw.to_string(),
                fallback: default,
            }),
        ),
    }
}

/// Draft produced by `model` from `fallback` and the staged diff
///
/// Any generator failure keeps `fallback` and records the error as the
/// draft's warning. The result is always normalized.
pub fn compose_draft<G: TextGenerator + ?Sized>(
    generator: &G,
    model: &str,
    fallback: &str,
    diff: &str,
    timeout: Duration,
) -> CommitDraft {
    let prompt = build_prompt(fallback, diff);
    info!(model, secs = timeout.as_secs(), "requesting commit message");

    let generated = generator
        .generate(model, &prompt, timeout)
        .and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(LlmError::EmptyOutput)
            } else {
                Ok(text.to_string())
            }
        });

    match generated {
        Ok(text) => CommitDraft::from_message(&text).with_model(model),
        Err(e) => {
            warn!(model, error = %e, "keeping fallback message");
            CommitDraft::from_message(fallback)
                .with_model(model)
                .with_warning(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Generator returning canned results and recording prompts
    pub struct FakeGenerator {
        pub available: bool,
        pub models: Vec<ModelInfo>,
        pub replies: RefCell<Vec<Result<String, LlmError>>>,
        pub prompts: RefCell<Vec<(String, String)>>,
    }

    impl FakeGenerator {
        pub fn new(models: &[&str]) -> Self {
            FakeGenerator {
                available: true,
                models: models
                    .iter()
                    .map(|id| ModelInfo {
                        id: id.to_string(),
                        label: format!("Fake: {}", id),
                    })
                    .collect(),
                replies: RefCell::new(Vec::new()),
                prompts: RefCell::new(Vec::new()),
            }
        }

        pub fn reply(self, reply: Result<String, LlmError>) -> Self {
            self.replies.borrow_mut().push(reply);
            self
        }
    }

    impl TextGenerator for FakeGenerator {
        fn is_available(&self) -> bool {
            self.available
        }

        fn list_models(&self, _timeout: Duration) -> Result<Vec<ModelInfo>, LlmError> {
            Ok(self.models.clone())
        }

        fn generate(&self, model: &str, prompt: &str, _timeout: Duration) -> Result<String, LlmError> {
            self.prompts
                .borrow_mut()
                .push((model.to_string(), prompt.to_string()));
            let mut replies = self.replies.borrow_mut();
            if replies.is_empty() {
                return Err(LlmError::EmptyOutput);
            }
            replies.remove(0)
        }
    }
}
