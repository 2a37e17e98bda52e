//! Entry points shared by the `gup` and `gitgo` binaries

pub mod orchestration;

pub use orchestration::{run_pipeline, Outcome, Pipeline, Variant};

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::load_settings;
use crate::error::GupError;
use crate::git::Git2Repository;
use crate::llm::LlmCli;
use crate::ui::{self, StdinPrompter};

/// Environment variable holding the log filter, e.g. `GUP_LOG=debug`
pub const LOG_ENV: &str = "GUP_LOG";

/// Send `tracing` output to stderr, filtered by `GUP_LOG` (default `warn`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run one release in the current directory and return the exit code
pub fn run(variant: Variant, settings_path: Option<&Path>) -> anyhow::Result<i32> {
    let settings = load_settings(settings_path).context("Error loading settings")?;

    let repo = match Git2Repository::discover(".") {
        Ok(repo) => repo,
        Err(GupError::NotARepository) => {
            ui::display_error("Not inside a Git repository.");
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };
    let mut config = repo.config_store()?;
    let generator = LlmCli::new(settings.llm_command.clone());
    let mut prompter = StdinPrompter;

    let outcome = run_pipeline(Pipeline {
        variant,
        settings: &settings,
        repo: &repo,
        config: &mut config,
        generator: &generator,
        prompter: &mut prompter,
    })?;
    tracing::debug!(?outcome, "release finished");
    Ok(outcome.exit_code())
}
