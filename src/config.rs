use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GupError, Result};

/// Tool settings shared by `gup` and `gitgo`.
///
/// Persisted per-repository state (saved model, saved timeout, identity) lives
/// in git config instead; these settings only provide defaults.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Remote that branches and tags are pushed to.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch pushed when HEAD is detached.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Text-generation executable.
    #[serde(default = "default_llm_command")]
    pub llm_command: String,

    /// Generation timeout used when `gup.timeout` is not set in git config.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deadline for probing a newly entered remote URL.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_llm_command() -> String {
    "llm".to_string()
}

fn default_timeout_secs() -> u64 {
    crate::llm::DEFAULT_TIMEOUT_SECS
}

fn default_probe_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            remote: default_remote(),
            default_branch: default_branch(),
            llm_command: default_llm_command(),
            timeout_secs: default_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Name of the settings file looked up in the working directory.
pub const LOCAL_SETTINGS_FILE: &str = "gup.toml";

/// Path of the per-user settings file, if a config directory exists.
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gup").join("config.toml"))
}

/// Loads settings from file or returns defaults.
///
/// Attempts to load settings in the following order:
/// 1. Custom path provided as parameter
/// 2. `gup.toml` in current directory
/// 3. `<config dir>/gup/config.toml`
/// 4. Default settings if no file found
///
/// # Returns
/// * `Ok(Settings)` - Loaded or default settings
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let candidate = match path {
        Some(path) => Some(path.to_path_buf()),
        None if Path::new(LOCAL_SETTINGS_FILE).exists() => Some(PathBuf::from(LOCAL_SETTINGS_FILE)),
        None => user_settings_path().filter(|p| p.exists()),
    };

    let Some(file) = candidate else {
        return Ok(Settings::default());
    };

    let content = fs::read_to_string(&file)
        .map_err(|e| GupError::config(format!("Cannot read {}: {}", file.display(), e)))?;
    parse_settings(&content)
        .map_err(|e| GupError::config(format!("Invalid settings in {}: {}", file.display(), e)))
}

/// Parses settings from TOML text; missing keys take their defaults.
pub fn parse_settings(content: &str) -> std::result::Result<Settings, toml::de::Error> {
    toml::from_str(content)
}
