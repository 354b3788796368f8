//! Health classification of fetched run records

use super::types::{HealthState, RunOutcome, RunRecord, ScheduleState};
use chrono::{DateTime, Duration, Utc};

/// Default staleness threshold
pub const DEFAULT_STALE_AFTER_DAYS: u32 = 30;

/// Classify a job's health.
///
/// Rules, first match wins:
/// 1. schedule disabled on the provider: `Inactive`
/// 2. workflow deleted or never fired: `Unknown`
/// 3. last scheduled run older than `stale_after`: `Inactive`
/// 4. last scheduled run failed: `Failing`
/// 5. otherwise `Active`
///
/// A job that is not running at all outranks one that ran and failed.
pub fn classify(record: &RunRecord, now: DateTime<Utc>, stale_after: Duration) -> HealthState {
    match record.schedule {
        ScheduleState::Disabled { .. } => return HealthState::Inactive,
        ScheduleState::Deleted => return HealthState::Unknown,
        ScheduleState::Active => {}
    }

    let Some(run) = &record.last_run else {
        return HealthState::Unknown;
    };

    if now.signed_duration_since(run.created_at) > stale_after {
        return HealthState::Inactive;
    }

    match run.outcome {
        RunOutcome::Failure => HealthState::Failing,
        RunOutcome::Success | RunOutcome::Unknown => HealthState::Active,
    }
}
