//! Credential resolution

use super::ConfigError;
use std::fmt;

/// Environment variable consulted last when resolving the credential
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Where the effective credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    CommandLine,
    ConfigFile,
    Environment,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandLine => f.write_str("command line"),
            Self::ConfigFile => f.write_str("config file"),
            Self::Environment => write!(f, "{TOKEN_ENV_VAR}"),
        }
    }
}

/// Provider access token.
///
/// `Debug` and `Display` never print the value; call [`Credential::expose`]
/// at the single point where the header is built.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn new(token: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            token: token.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<redacted token from {}>", self.source)
    }
}

/// Pick the effective credential: command line, then config file, then
/// environment. Blank values count as absent.
///
/// # Errors
///
/// Returns `ConfigError::MissingCredential` when all three sources are empty.
pub fn resolve_credential(
    cli: Option<&str>,
    config_file: Option<&str>,
    env: Option<&str>,
) -> Result<Credential, ConfigError> {
    let candidates = [
        (cli, CredentialSource::CommandLine),
        (config_file, CredentialSource::ConfigFile),
        (env, CredentialSource::Environment),
    ];

    candidates
        .into_iter()
        .find_map(|(value, source)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Credential::new(v, source))
        })
        .ok_or(ConfigError::MissingCredential)
}
