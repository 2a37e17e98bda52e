use crate::error::{GupError, Result};
use crate::git::{ConfigScope, ConfigStore};
use git2::{Config, ConfigLevel, ErrorCode};
use tracing::debug;

/// [ConfigStore] over a repository's git configuration
///
/// Reads and writes go to exactly one level: `.git/config` for
/// [ConfigScope::Local] and the user's global file for [ConfigScope::Global].
pub struct GitConfigStore {
    config: Config,
}

impl GitConfigStore {
    pub fn new(config: Config) -> Self {
        GitConfigStore { config }
    }

    fn level(&self, scope: ConfigScope) -> Result<Option<Config>> {
        let level = match scope {
            ConfigScope::Local => ConfigLevel::Local,
            ConfigScope::Global => ConfigLevel::Global,
        };
        match self.config.open_level(level) {
            Ok(config) => Ok(Some(config)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ConfigStore for GitConfigStore {
    fn get(&self, scope: ConfigScope, key: &str) -> Result<Option<String>> {
        let Some(config) = self.level(scope)? else {
            return Ok(None);
        };
        match config.get_string(key) {
            Ok(value) => {
                let value = value.trim().to_string();
                Ok((!value.is_empty()).then_some(value))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GupError::config(format!(
                "Cannot read '{}': {}",
                key,
                e.message()
            ))),
        }
    }

    fn set(&mut self, scope: ConfigScope, key: &str, value: &str) -> Result<()> {
        let mut config = self.level(scope)?.ok_or_else(|| {
            GupError::config(format!("No {:?} git configuration file to write '{}'", scope, key))
        })?;
        config.set_str(key, value).map_err(|e| {
            GupError::config(format!("Cannot write '{}': {}", key, e.message()))
        })?;
        debug!(?scope, key, "saved config value");
        Ok(())
    }
}
