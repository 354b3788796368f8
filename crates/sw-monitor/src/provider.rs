//! Provider trait for scheduled-workflow queries

use super::error::ProviderError;
use super::types::{RunSummary, WorkflowInfo};
use schedwatch_core::{Credential, JobRef, RepositoryRef};

/// Read-only access to a CI provider's workflow and run endpoints.
///
/// Calls are synchronous; the credential is passed on every call rather than
/// stored, so one provider value can serve any token. `Send + Sync` lets
/// [`check_all`](crate::check_all) share a provider across worker threads.
pub trait ScheduleProvider: Send + Sync + std::fmt::Debug {
    /// Current definition and schedule state of `job`
    fn get_workflow(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<WorkflowInfo, ProviderError>;

    /// Most recent run of `job` triggered by its schedule, if any
    fn latest_scheduled_run(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<Option<RunSummary>, ProviderError>;

    /// Provider name for logging/display
    fn provider_name(&self) -> &str;
}
