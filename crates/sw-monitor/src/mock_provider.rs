//! Mock schedule provider for testing

use super::error::ProviderError;
use super::provider::ScheduleProvider;
use super::types::{RunOutcome, RunSummary, ScheduleState, WorkflowInfo};
use chrono::{DateTime, Utc};
use schedwatch_core::{Credential, JobRef, RepositoryRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned failure modes, mirroring what the real provider can return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    NotFound,
    BadCredentials,
    RateLimited,
    ServerError,
    Malformed,
}

impl MockFailure {
    fn to_error(self, resource: String) -> ProviderError {
        match self {
            Self::NotFound => ProviderError::NotFound { resource },
            Self::BadCredentials => ProviderError::Authentication {
                status: 401,
                message: "Bad credentials".to_string(),
            },
            Self::RateLimited => ProviderError::Transient {
                message: "rate limited: API rate limit exceeded".to_string(),
                source: None,
            },
            Self::ServerError => ProviderError::Transient {
                message: "HTTP 502: Bad Gateway".to_string(),
                source: None,
            },
            Self::Malformed => ProviderError::Unexpected {
                message: format!("failed to parse response for {resource}"),
                source: None,
            },
        }
    }
}

/// Record of method calls for test assertions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    GetWorkflow { repository: String, job: String },
    LatestScheduledRun { repository: String, job: String },
}

#[derive(Debug, Clone)]
enum MockEntry {
    Job {
        workflow: WorkflowInfo,
        last_run: Option<RunSummary>,
    },
    Failure(MockFailure),
}

/// Mock provider returning canned workflows and runs.
///
/// Jobs that were never registered answer `NotFound`, like the real API.
#[derive(Debug, Clone, Default)]
pub struct MockScheduleProvider {
    entries: HashMap<(String, String), MockEntry>,
    /// If set, every call fails this way
    pub error: Option<MockFailure>,
    /// If set, calls with any other token fail with `BadCredentials`
    pub expected_token: Option<String>,
    /// Track calls for verification
    pub call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl MockScheduleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job with its workflow definition and latest scheduled run
    pub fn with_job(
        mut self,
        repository: &str,
        job: &str,
        workflow: WorkflowInfo,
        last_run: Option<RunSummary>,
    ) -> Self {
        self.entries.insert(
            (repository.to_string(), job.to_string()),
            MockEntry::Job { workflow, last_run },
        );
        self
    }

    /// Make every call for one job fail
    pub fn with_job_failure(mut self, repository: &str, job: &str, failure: MockFailure) -> Self {
        self.entries.insert(
            (repository.to_string(), job.to_string()),
            MockEntry::Failure(failure),
        );
        self
    }

    /// Set the failure that all calls should return
    pub fn with_error(mut self, failure: MockFailure) -> Self {
        self.error = Some(failure);
        self
    }

    /// Only accept this token
    pub fn with_expected_token(mut self, token: &str) -> Self {
        self.expected_token = Some(token.to_string());
        self
    }

    /// Get a copy of the call log for assertions
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    fn log_call(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }

    fn lookup(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<(&WorkflowInfo, &Option<RunSummary>), ProviderError> {
        let resource = format!("workflow '{job}' in {repo}");

        if let Some(failure) = self.error {
            return Err(failure.to_error(resource));
        }
        if let Some(expected) = &self.expected_token
            && credential.expose() != expected.as_str()
        {
            return Err(MockFailure::BadCredentials.to_error(resource));
        }

        match self
            .entries
            .get(&(repo.full_name(), job.as_str().to_string()))
        {
            Some(MockEntry::Job { workflow, last_run }) => Ok((workflow, last_run)),
            Some(MockEntry::Failure(failure)) => Err(failure.to_error(resource)),
            None => Err(MockFailure::NotFound.to_error(resource)),
        }
    }
}

impl ScheduleProvider for MockScheduleProvider {
    fn get_workflow(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<WorkflowInfo, ProviderError> {
        self.log_call(MockCall::GetWorkflow {
            repository: repo.full_name(),
            job: job.to_string(),
        });
        self.lookup(repo, job, credential)
            .map(|(workflow, _)| workflow.clone())
    }

    fn latest_scheduled_run(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<Option<RunSummary>, ProviderError> {
        self.log_call(MockCall::LatestScheduledRun {
            repository: repo.full_name(),
            job: job.to_string(),
        });
        self.lookup(repo, job, credential)
            .map(|(_, last_run)| last_run.clone())
    }

    fn provider_name(&self) -> &str {
        "MockScheduleProvider"
    }
}

/// Helper function to create a test workflow definition
pub fn create_test_workflow(repository: &str, file: &str, state: ScheduleState) -> WorkflowInfo {
    WorkflowInfo {
        name: file.trim_end_matches(".yml").to_string(),
        path: format!(".github/workflows/{file}"),
        state,
        html_url: format!("https://github.com/{repository}/blob/main/.github/workflows/{file}"),
    }
}

/// Helper function to create a test scheduled run
pub fn create_test_run(id: u64, created_at: DateTime<Utc>, outcome: RunOutcome) -> RunSummary {
    RunSummary {
        id,
        created_at,
        outcome,
        html_url: format!("https://github.com/test/repo/actions/runs/{id}"),
    }
}
