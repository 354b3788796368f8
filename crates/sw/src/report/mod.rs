//! Report rendering for checked jobs

use chrono::{DateTime, Utc};
use schedwatch_monitor::{HealthState, JobOutcome, RepositoryReport};
use serde::Serialize;
use std::fmt;

mod json;
mod text;

pub use json::render_json;
pub use text::render_text;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text { color: bool },
    Json,
}

/// Job counts per displayed state
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub failing: usize,
    pub unknown: usize,
    pub not_found: usize,
}

impl Summary {
    pub fn from_reports(reports: &[RepositoryReport]) -> Self {
        let mut summary = Self::default();
        for job in reports.iter().flat_map(|r| &r.jobs) {
            summary.total += 1;
            if job.outcome == JobOutcome::NotFound {
                summary.not_found += 1;
                continue;
            }
            match job.outcome.health() {
                HealthState::Active => summary.active += 1,
                HealthState::Inactive => summary.inactive += 1,
                HealthState::Failing => summary.failing += 1,
                HealthState::Unknown => summary.unknown += 1,
            }
        }
        summary
    }

    /// True when every checked job is active (vacuously true for no jobs)
    pub fn all_active(&self) -> bool {
        self.active == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Checked {} workflows: {} active, {} inactive, {} failing, {} unknown, {} not found.",
            self.total, self.active, self.inactive, self.failing, self.unknown, self.not_found
        )
    }
}

/// Where to send the user for a job.
///
/// Inactive workflows link to their Actions page, where the schedule can be
/// re-enabled; everything else links to the last scheduled run.
pub fn job_link(outcome: &JobOutcome) -> Option<&str> {
    let JobOutcome::Checked { record, health } = outcome else {
        return None;
    };
    match health {
        HealthState::Inactive => record.workflow_url.as_deref(),
        _ => record.last_run.as_ref().map(|run| run.html_url.as_str()),
    }
}

/// Render the full report into one buffer
pub fn render(
    reports: &[RepositoryReport],
    summary: &Summary,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text { color } => render_text(reports, summary, now, color)?,
        OutputFormat::Json => render_json(reports, summary, now)?,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use schedwatch_core::{JobRef, RepositoryRef};
    use schedwatch_monitor::{
        HealthState, JobOutcome, JobReport, RepositoryReport, RunOutcome, RunRecord, RunSummary,
        ScheduleState,
    };

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    pub fn checked(
        schedule: ScheduleState,
        age: Option<Duration>,
        outcome: RunOutcome,
        health: HealthState,
    ) -> JobOutcome {
        JobOutcome::Checked {
            record: RunRecord {
                schedule,
                last_run: age.map(|age| RunSummary {
                    id: 42,
                    created_at: now() - age,
                    outcome,
                    html_url: "https://github.com/octo/repo/actions/runs/42".to_string(),
                }),
                workflow_url: Some(
                    "https://github.com/octo/repo/actions/workflows/nightly.yml".to_string(),
                ),
            },
            health,
        }
    }

    pub fn repo(name: &str, jobs: Vec<(&str, JobOutcome)>) -> RepositoryReport {
        RepositoryReport {
            repository: name.parse::<RepositoryRef>().unwrap(),
            jobs: jobs
                .into_iter()
                .map(|(job, outcome)| JobReport {
                    job: JobRef::new(job).unwrap(),
                    outcome,
                })
                .collect(),
        }
    }
}
