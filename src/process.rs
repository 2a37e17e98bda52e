//! Running external commands under a deadline.

use std::process::{Command, Output, Stdio};
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::error::ProcessError;

/// Run `command` to completion, giving up after `limit`.
///
/// The command runs on a single-threaded runtime built for this call. Stdin is
/// closed and both output streams are captured. On expiry the child is killed
/// and abandoned; nothing is retried.
pub fn run_with_timeout(command: Command, limit: Duration) -> Result<Output, ProcessError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ProcessError::Runtime)?;

    let mut command = tokio::process::Command::from(command);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let secs = limit.as_secs();
    let result = runtime.block_on(async { timeout(limit, command.output()).await });
    match result {
        Ok(output) => output.map_err(ProcessError::Spawn),
        Err(_) => {
            debug!(secs, "process deadline expired, killing child");
            Err(ProcessError::Timeout(secs))
        }
    }
}
