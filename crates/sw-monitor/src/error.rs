//! Error types for provider calls and batch checks

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single provider query
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Repository or workflow does not exist, or the token cannot see it
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Credential rejected; every later call would fail the same way
    #[error("authentication rejected (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// Rate limiting, server errors and transport failures
    #[error("provider temporarily unavailable: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Any other non-success response or an undecodable body
    #[error("unexpected provider response: {message}")]
    Unexpected {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Client could not be constructed
    #[error("provider setup failed: {message}")]
    Setup {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ProviderError {
    /// Errors that must abort the whole invocation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Setup { .. })
    }
}

/// Failure that aborts a batch of checks
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("cannot continue: provider rejected the request for {repository} {job}")]
    Aborted {
        repository: String,
        job: String,
        #[source]
        source: ProviderError,
    },
}
