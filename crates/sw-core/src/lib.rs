//! Core types for schedwatch
//!
//! This crate holds everything that happens before the first network call:
//! the watch-list schema (`owner/name` repositories and their scheduled
//! workflow files), YAML config loading, credential resolution, logging
//! setup and small text helpers shared by the reporter.

pub mod config;
pub mod logging;
pub mod schema;
pub mod text;

pub use config::{ConfigError, Credential, CredentialSource, WatchConfig};
pub use schema::{JobRef, RepositoryRef};
