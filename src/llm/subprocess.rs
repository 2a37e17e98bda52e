use std::process::Command;
use std::time::Duration;

use tracing::debug;

use super::{models::parse_models, ModelInfo, TextGenerator};
use crate::error::LlmError;
use crate::process::run_with_timeout;

/// [TextGenerator] backed by the `llm` command-line tool
#[derive(Debug, Clone)]
pub struct LlmCli {
    command: String,
}

impl LlmCli {
    pub fn new(command: impl Into<String>) -> Self {
        LlmCli {
            command: command.into(),
        }
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<String, LlmError> {
        let mut command = Command::new(&self.command);
        command.args(args);

        let output = run_with_timeout(command, timeout)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LlmError::NonZeroExit {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(LlmError::EmptyOutput);
        }
        Ok(stdout)
    }
}

impl Default for LlmCli {
    fn default() -> Self {
        LlmCli::new("llm")
    }
}

impl TextGenerator for LlmCli {
    fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    fn list_models(&self, timeout: Duration) -> Result<Vec<ModelInfo>, LlmError> {
        if !self.is_available() {
            return Err(LlmError::NotInstalled(self.command.clone()));
        }
        let output = self.run(&["models"], timeout)?;
        let models = parse_models(&output);
        debug!(count = models.len(), "listed models");
        Ok(models)
    }

    fn generate(&self, model: &str, prompt: &str, timeout: Duration) -> Result<String, LlmError> {
        debug!(model, prompt_bytes = prompt.len(), "running generator");
        self.run(&["-m", model, prompt], timeout)
    }
}
