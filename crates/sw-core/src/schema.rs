//! Watch-list schema: repositories and the scheduled jobs tracked in them

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reason a string could not be used as a repository identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryRefError {
    #[error("expected 'owner/name', found no '/'")]
    MissingSeparator,

    #[error("expected exactly one '/' in 'owner/name'")]
    TooManySeparators,

    #[error("owner and name must both be non-empty")]
    EmptyPart,

    #[error("invalid character {0:?} (allowed: letters, digits, '-', '_', '.')")]
    InvalidCharacter(char),
}

/// A repository on the provider, keyed by `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical `owner/name` key
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    fn validate_part(part: &str) -> Result<(), RepositoryRefError> {
        if part.is_empty() {
            return Err(RepositoryRefError::EmptyPart);
        }
        if let Some(c) = part
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(RepositoryRefError::InvalidCharacter(c));
        }
        Ok(())
    }
}

impl FromStr for RepositoryRef {
    type Err = RepositoryRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, name) = s
            .split_once('/')
            .ok_or(RepositoryRefError::MissingSeparator)?;
        if name.contains('/') {
            return Err(RepositoryRefError::TooManySeparators);
        }
        Self::validate_part(owner)?;
        Self::validate_part(name)?;
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Serialize for RepositoryRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A scheduled job inside a repository, identified by its workflow file name
/// (e.g. `nightly.yml`) or numeric workflow id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobRef(String);

impl JobRef {
    /// Returns `None` for blank identifiers.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
