use thiserror::Error;

/// Unified error type for gup operations
#[derive(Error, Debug)]
pub enum GupError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Not inside a Git repository")]
    NotARepository,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Commit failed: {0}")]
    Commit(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in gup
pub type Result<T> = std::result::Result<T, GupError>;

impl GupError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GupError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        GupError::Tag(msg.into())
    }

    /// Create a commit error with context
    pub fn commit(msg: impl Into<String>) -> Self {
        GupError::Commit(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        GupError::Remote(msg.into())
    }
}

/// Failures of a subprocess run under a deadline.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Process timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors from the external text-generation CLI.
///
/// All of these are recoverable: the caller keeps its fallback message.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("'{0}' executable not found on PATH")]
    NotInstalled(String),

    #[error("Failed to run AI command: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("AI request timed out after {0} seconds")]
    Timeout(u64),

    #[error("AI command exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("AI returned empty output")]
    EmptyOutput,
}

impl From<ProcessError> for LlmError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Runtime(e) | ProcessError::Spawn(e) => LlmError::SpawnFailed(e),
            ProcessError::Timeout(secs) => LlmError::Timeout(secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GupError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GupError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GupError::config("x"), "Configuration error"),
            (GupError::tag("x"), "Tag error"),
            (GupError::commit("x"), "Commit failed"),
            (GupError::remote("x"), "Remote operation failed"),
            (GupError::NotARepository, "Not inside a Git repository"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_process_timeout_maps_to_llm_timeout() {
        let err: LlmError = ProcessError::Timeout(12).into();
        assert!(matches!(err, LlmError::Timeout(12)));
        assert_eq!(err.to_string(), "AI request timed out after 12 seconds");
    }

    #[test]
    fn test_process_spawn_maps_to_llm_spawn_failed() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: LlmError = ProcessError::Spawn(io_err).into();
        assert!(matches!(err, LlmError::SpawnFailed(_)));
    }

    #[test]
    fn test_non_zero_exit_names_code_and_stderr() {
        let err = LlmError::NonZeroExit {
            code: 2,
            stderr: "Unknown model".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("code 2"));
        assert!(msg.contains("Unknown model"));
    }
}
