//! YAML watch-list loading

use super::credential::{resolve_credential, Credential, CredentialSource};
use super::ConfigError;
use crate::schema::{JobRef, RepositoryRef};
use serde_yaml::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reserved top-level key holding the access token
pub const TOKEN_KEY: &str = "token";

/// One repository and the scheduled jobs to check in it, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryGroup {
    pub repository: RepositoryRef,
    pub jobs: Vec<JobRef>,
}

/// A validated top-level entry of the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEntry {
    Repository(RepositoryGroup),
    Token(Credential),
}

impl ConfigEntry {
    /// Validate a single `key: value` pair.
    ///
    /// Returns a message naming the offending key on failure; the caller
    /// attaches the file path.
    fn parse(key: &Value, value: &Value) -> Result<Self, String> {
        let key = key
            .as_str()
            .ok_or_else(|| format!("top-level key {} is not a string", describe(key)))?;

        if key == TOKEN_KEY {
            let token = value.as_str().ok_or_else(|| {
                format!("'{TOKEN_KEY}' must be a string, found {}", describe(value))
            })?;
            return Ok(Self::Token(Credential::new(token, CredentialSource::ConfigFile)));
        }

        let repository: RepositoryRef = key.parse().map_err(|e| {
            format!("key '{key}' is neither '{TOKEN_KEY}' nor a repository 'owner/name': {e}")
        })?;

        let items = value.as_sequence().ok_or_else(|| {
            format!(
                "'{key}' must be a list of workflow file names, found {}",
                describe(value)
            )
        })?;

        let jobs = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                item.as_str()
                    .and_then(JobRef::new)
                    .ok_or_else(|| {
                        format!(
                            "'{key}' entry #{} must be a non-empty workflow file name, found {}",
                            idx + 1,
                            describe(item)
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Repository(RepositoryGroup { repository, jobs }))
    }
}

/// Parsed watch list
#[derive(Debug, Clone)]
pub struct WatchConfig {
    path: PathBuf,
    repositories: Vec<RepositoryGroup>,
    token: Option<Credential>,
}

impl WatchConfig {
    /// Load and validate a watch list from disk
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if its content is not a valid watch list.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents, path)
    }

    /// Validate a watch list from YAML text; `path` is only used in errors
    pub fn from_yaml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let root: Value = serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))?;
        let mapping = root.as_mapping().ok_or_else(|| {
            parse_err(format!(
                "expected a mapping of 'owner/name' keys, found {}",
                describe(&root)
            ))
        })?;

        let mut repositories = Vec::new();
        let mut token = None;
        let mut seen = HashSet::new();

        for (key, value) in mapping {
            match ConfigEntry::parse(key, value).map_err(parse_err)? {
                ConfigEntry::Token(credential) => token = Some(credential),
                ConfigEntry::Repository(group) => {
                    if !seen.insert(group.repository.clone()) {
                        return Err(parse_err(format!(
                            "repository '{}' is listed more than once",
                            group.repository
                        )));
                    }
                    repositories.push(group);
                }
            }
        }

        debug!(
            path = %path.display(),
            repositories = repositories.len(),
            has_token = token.is_some(),
            "loaded watch list"
        );

        Ok(Self {
            path: path.to_path_buf(),
            repositories,
            token,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Repository groups in file order
    pub fn repositories(&self) -> &[RepositoryGroup] {
        &self.repositories
    }

    /// Total number of (repository, job) pairs
    pub fn job_count(&self) -> usize {
        self.repositories.iter().map(|g| g.jobs.len()).sum()
    }

    /// Token found under the reserved `token` key, if any
    pub fn file_token(&self) -> Option<&Credential> {
        self.token.as_ref()
    }

    /// Resolve the effective credential against this file's `token` key
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` when no source has a value.
    pub fn credential(
        &self,
        cli: Option<&str>,
        env: Option<&str>,
    ) -> Result<Credential, ConfigError> {
        resolve_credential(cli, self.token.as_ref().map(Credential::expose), env)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string '{s}'"),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(t) => format!("tagged value {}", t.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(yaml: &str) -> Result<WatchConfig, ConfigError> {
        WatchConfig::from_yaml_str(yaml, Path::new("watch.yml"))
    }

    fn parse_message(yaml: &str) -> String {
        match parse(yaml) {
            Err(ConfigError::Parse { message, .. }) => message,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_preserves_file_order() {
        let config = parse(
            "zeta/last:\n  - b.yml\n  - a.yml\ntoken: t1\nalpha/first:\n  - c.yml\n",
        )
        .unwrap();

        let names: Vec<String> = config
            .repositories()
            .iter()
            .map(|g| g.repository.full_name())
            .collect();
        assert_eq!(names, vec!["zeta/last", "alpha/first"]);

        let jobs: Vec<&str> = config.repositories()[0].jobs.iter().map(JobRef::as_str).collect();
        assert_eq!(jobs, vec!["b.yml", "a.yml"]);
        assert_eq!(config.job_count(), 3);
        assert_eq!(config.file_token().map(Credential::expose), Some("t1"));
    }

    #[test]
    fn test_cli_token_overrides_file_token() {
        let config = parse("a/b:\n  - x.yml\ntoken: t1\n").unwrap();
        let cred = config.credential(Some("t2"), None).unwrap();
        assert_eq!(cred.expose(), "t2");
    }

    #[test]
    fn test_file_token_used_without_cli() {
        let config = parse("a/b:\n  - x.yml\ntoken: t1\n").unwrap();
        let cred = config.credential(None, Some("env")).unwrap();
        assert_eq!(cred.expose(), "t1");
        assert_eq!(cred.source(), CredentialSource::ConfigFile);
    }

    #[test]
    fn test_rejects_key_without_slash() {
        let message = parse_message("not-a-repo:\n  - x.yml\n");
        assert!(message.contains("not-a-repo"), "{message}");
    }

    #[test]
    fn test_rejects_non_list_value() {
        let message = parse_message("a/b: x.yml\n");
        assert!(message.contains("'a/b' must be a list"), "{message}");
    }

    #[test]
    fn test_rejects_non_string_job() {
        let message = parse_message("a/b:\n  - x.yml\n  - 42\n");
        assert!(message.contains("entry #2"), "{message}");
    }

    #[test]
    fn test_rejects_non_string_token() {
        let message = parse_message("token:\n  - nope\n");
        assert!(message.contains("'token' must be a string"), "{message}");
    }

    #[test]
    fn test_rejects_non_mapping_document() {
        let message = parse_message("- a/b\n- c/d\n");
        assert!(message.contains("expected a mapping"), "{message}");
    }

    #[test]
    fn test_rejects_invalid_yaml() {
        assert!(matches!(parse("a/b: [x.yml\n"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_rejects_non_string_key() {
        let message = parse_message("42:\n  - x.yml\n");
        assert!(message.contains("not a string"), "{message}");
    }

    #[test]
    fn test_allows_repository_with_no_jobs() {
        let config = parse("a/b: []\n").unwrap();
        assert_eq!(config.repositories().len(), 1);
        assert!(config.repositories()[0].jobs.is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "octo/repo:\n  - nightly.yml").unwrap();

        let config = WatchConfig::load(file.path()).unwrap();
        assert_eq!(config.path(), file.path());
        assert_eq!(config.repositories()[0].repository.full_name(), "octo/repo");
        assert!(config.file_token().is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = WatchConfig::load(Path::new("/nonexistent/schedwatch/watch.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_debug_does_not_leak_file_token() {
        let config = parse("a/b:\n  - x.yml\ntoken: ghp_hidden\n").unwrap();
        assert!(!format!("{config:?}").contains("ghp_hidden"));
    }
}
