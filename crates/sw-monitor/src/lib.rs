//! Scheduled-workflow health checks
//!
//! Queries a CI provider for the latest scheduled run and the schedule
//! state of each watched workflow, then classifies the result into a
//! [`HealthState`].

mod classify;
mod error;
mod fetch;
mod github;
#[cfg(any(test, feature = "test-support"))]
mod mock_provider;
mod provider;
mod types;

pub use classify::{classify, DEFAULT_STALE_AFTER_DAYS};
pub use error::{MonitorError, ProviderError};
pub use fetch::{check_all, check_job, fetch_run_record, CheckOptions, MAX_CONCURRENCY};
pub use github::{GitHubActionsProvider, DEFAULT_API_URL};
#[cfg(any(test, feature = "test-support"))]
pub use mock_provider::{
    create_test_run, create_test_workflow, MockCall, MockFailure, MockScheduleProvider,
};
pub use provider::ScheduleProvider;
pub use types::{
    HealthState, JobOutcome, JobReport, RepositoryReport, RunOutcome, RunRecord, RunSummary,
    ScheduleState, WorkflowInfo,
};
