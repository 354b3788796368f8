//! Status fetching across a watch list

use super::classify::{classify, DEFAULT_STALE_AFTER_DAYS};
use super::error::{MonitorError, ProviderError};
use super::provider::ScheduleProvider;
use super::types::{JobOutcome, JobReport, RepositoryReport, RunRecord};
use chrono::{DateTime, Duration, Utc};
use schedwatch_core::config::RepositoryGroup;
use schedwatch_core::{Credential, JobRef, RepositoryRef};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Upper bound for parallel provider queries
pub const MAX_CONCURRENCY: usize = 16;

/// Policy for one batch of checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Reference time for staleness
    pub now: DateTime<Utc>,
    /// Maximum age of the last scheduled run
    pub stale_after: Duration,
    /// Jobs queried at once; 1 means strictly sequential
    pub concurrency: usize,
}

impl CheckOptions {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            stale_after: Duration::days(i64::from(DEFAULT_STALE_AFTER_DAYS)),
            concurrency: 1,
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }
}

/// Query the provider for one job's schedule state and latest scheduled run.
///
/// Issues the workflow query first so a missing workflow costs one call.
pub fn fetch_run_record<P: ScheduleProvider + ?Sized>(
    provider: &P,
    repo: &RepositoryRef,
    job: &JobRef,
    credential: &Credential,
) -> Result<RunRecord, ProviderError> {
    let workflow = provider.get_workflow(repo, job, credential)?;
    let last_run = provider.latest_scheduled_run(repo, job, credential)?;

    Ok(RunRecord {
        workflow_url: Some(workflow.actions_url()),
        schedule: workflow.state,
        last_run,
    })
}

/// Fetch and classify one job.
///
/// Per-job failures become [`JobOutcome`] sentinels; only credential-class
/// failures are returned as errors.
///
/// # Errors
///
/// Returns `MonitorError::Aborted` when the provider rejects the credential.
pub fn check_job<P: ScheduleProvider + ?Sized>(
    provider: &P,
    repo: &RepositoryRef,
    job: &JobRef,
    credential: &Credential,
    options: &CheckOptions,
) -> Result<JobOutcome, MonitorError> {
    match fetch_run_record(provider, repo, job, credential) {
        Ok(record) => {
            let health = classify(&record, options.now, options.stale_after);
            debug!(repository = %repo, job = %job, %health, "classified job");
            Ok(JobOutcome::Checked { record, health })
        }
        Err(e) if e.is_fatal() => Err(MonitorError::Aborted {
            repository: repo.full_name(),
            job: job.to_string(),
            source: e,
        }),
        Err(ProviderError::NotFound { resource }) => {
            warn!(repository = %repo, job = %job, "{resource} not found");
            Ok(JobOutcome::NotFound)
        }
        Err(e) => {
            warn!(repository = %repo, job = %job, error = %e, "job check failed");
            Ok(JobOutcome::Unavailable {
                reason: e.to_string(),
            })
        }
    }
}

/// Check every job of every repository group.
///
/// The returned reports follow config order regardless of `concurrency`.
///
/// # Errors
///
/// Returns `MonitorError::Aborted` on the first credential-class failure;
/// remaining jobs are not queried.
pub fn check_all<P: ScheduleProvider + ?Sized>(
    provider: &P,
    groups: &[RepositoryGroup],
    credential: &Credential,
    options: &CheckOptions,
) -> Result<Vec<RepositoryReport>, MonitorError> {
    let pairs: Vec<(&RepositoryRef, &JobRef)> = groups
        .iter()
        .flat_map(|g| g.jobs.iter().map(move |job| (&g.repository, job)))
        .collect();

    debug!(
        provider = provider.provider_name(),
        jobs = pairs.len(),
        concurrency = options.concurrency,
        "checking scheduled jobs"
    );

    let outcomes = if options.concurrency <= 1 || pairs.len() <= 1 {
        pairs
            .iter()
            .map(|(repo, job)| check_job(provider, repo, job, credential, options))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        check_parallel(provider, &pairs, credential, options)?
    };
    let mut outcomes = outcomes.into_iter();

    Ok(groups
        .iter()
        .map(|group| RepositoryReport {
            repository: group.repository.clone(),
            jobs: group
                .jobs
                .iter()
                .zip(outcomes.by_ref())
                .map(|(job, outcome)| JobReport {
                    job: job.clone(),
                    outcome,
                })
                .collect(),
        })
        .collect())
}

/// Bounded fan-out over scoped threads. Workers pull the next index from a
/// shared counter; results are slotted back by index.
fn check_parallel<P: ScheduleProvider + ?Sized>(
    provider: &P,
    pairs: &[(&RepositoryRef, &JobRef)],
    credential: &Credential,
    options: &CheckOptions,
) -> Result<Vec<JobOutcome>, MonitorError> {
    let next = &AtomicUsize::new(0);
    let stop = &AtomicBool::new(false);
    let workers = options.concurrency.min(pairs.len());

    let mut slots: Vec<Option<Result<JobOutcome, MonitorError>>> =
        (0..pairs.len()).map(|_| None).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    while !stop.load(Ordering::Relaxed) {
                        let idx = next.fetch_add(1, Ordering::Relaxed);
                        let Some((repo, job)) = pairs.get(idx) else {
                            break;
                        };
                        let result = check_job(provider, repo, job, credential, options);
                        if result.is_err() {
                            stop.store(true, Ordering::Relaxed);
                        }
                        done.push((idx, result));
                    }
                    done
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(done) => {
                    for (idx, result) in done {
                        slots[idx] = Some(result);
                    }
                }
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    });

    // Report the earliest failure in config order
    if let Some(pos) = slots.iter().position(|s| matches!(s, Some(Err(_))))
        && let Some(Err(e)) = slots.swap_remove(pos)
    {
        return Err(e);
    }

    Ok(slots
        .into_iter()
        .map(|slot| match slot {
            Some(Ok(outcome)) => outcome,
            _ => JobOutcome::Unavailable {
                reason: "not checked".to_string(),
            },
        })
        .collect())
}
