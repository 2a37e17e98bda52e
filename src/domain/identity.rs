use std::fmt;

use crate::error::Result;
use crate::git::{ConfigScope, ConfigStore};
use crate::ui::Prompter;

pub const NAME_KEY: &str = "user.name";
pub const EMAIL_KEY: &str = "user.email";

/// Where the commit identity came from; display only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Repo,
    Global,
    Prompted,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IdentitySource::Repo => "repo",
            IdentitySource::Global => "global",
            IdentitySource::Prompted => "prompted",
        };
        f.write_str(name)
    }
}

/// Name and email used as both author and committer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub source: IdentitySource,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>, source: IdentitySource) -> Self {
        Identity {
            name: name.into(),
            email: email.into(),
            source,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> [{}]", self.name, self.email, self.source)
    }
}

fn read_scope<C: ConfigStore + ?Sized>(config: &C, scope: ConfigScope) -> Result<(String, String)> {
    let name = config.get(scope, NAME_KEY)?.unwrap_or_default();
    let email = config.get(scope, EMAIL_KEY)?.unwrap_or_default();
    Ok((name, email))
}

/// Identity from repository config, falling back to global config
///
/// A scope is used as soon as it sets either key. Returns `None` when neither
/// scope sets anything.
pub fn read_identity<C: ConfigStore + ?Sized>(config: &C) -> Result<Option<Identity>> {
    for (scope, source) in [
        (ConfigScope::Local, IdentitySource::Repo),
        (ConfigScope::Global, IdentitySource::Global),
    ] {
        let (name, email) = read_scope(config, scope)?;
        if !name.is_empty() || !email.is_empty() {
            return Ok(Some(Identity::new(name, email, source)));
        }
    }
    Ok(None)
}

/// Ask for a name and email; blank answers keep the current values
pub fn prompt_identity<P: Prompter + ?Sized>(
    prompter: &mut P,
    name: &str,
    email: &str,
) -> Result<(String, String)> {
    println!("\nEnter commit identity (blank keeps current):");
    let new_name = prompter.ask(&format!("Name [{}]: ", name))?;
    let new_email = prompter.ask(&format!("Email [{}]: ", email))?;

    let pick = |answer: String, current: &str| {
        if answer.is_empty() {
            current.to_string()
        } else {
            answer
        }
    };
    Ok((pick(new_name, name), pick(new_email, email)))
}

/// Identity for this run: configured, or prompted for when none is configured
///
/// Prompted values are not written anywhere.
pub fn resolve_identity<C, P>(config: &C, prompter: &mut P) -> Result<Identity>
where
    C: ConfigStore + ?Sized,
    P: Prompter + ?Sized,
{
    if let Some(identity) = read_identity(config)? {
        return Ok(identity);
    }
    let (name, email) = prompt_identity(prompter, "", "")?;
    Ok(Identity::new(name, email, IdentitySource::Prompted))
}

/// Write the identity to repository config
pub fn save_identity<C: ConfigStore + ?Sized>(
    config: &mut C,
    name: &str,
    email: &str,
) -> Result<Identity> {
    config.set(ConfigScope::Local, NAME_KEY, name)?;
    config.set(ConfigScope::Local, EMAIL_KEY, email)?;
    Ok(Identity::new(name, email, IdentitySource::Repo))
}
