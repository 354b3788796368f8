//! Watch-list configuration
//!
//! The config file is a YAML mapping whose keys are either repository
//! identifiers (`owner/name`, value: list of workflow file names) or the
//! reserved key `token` (value: access token string).
//!
//! The effective credential is resolved with priority:
//! 1. Command-line flag
//! 2. `token` key in the config file
//! 3. `GITHUB_TOKEN` environment variable

mod credential;
mod loader;

pub use credential::{resolve_credential, Credential, CredentialSource, TOKEN_ENV_VAR};
pub use loader::{ConfigEntry, RepositoryGroup, WatchConfig, TOKEN_KEY};

use std::path::PathBuf;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not a valid watch list
    #[error("invalid config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// No credential from any source
    #[error(
        "missing access token: pass --token, add a 'token' key to the config file, \
         or set the {TOKEN_ENV_VAR} environment variable"
    )]
    MissingCredential,
}
