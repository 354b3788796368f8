//! Shared types for scheduled-workflow checks

use chrono::{DateTime, Utc};
use schedwatch_core::{JobRef, RepositoryRef};
use serde::Serialize;
use std::fmt;

/// Outcome of a single run, reduced to what health classification needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    Failure,
    /// Still running, skipped, neutral or otherwise inconclusive
    Unknown,
}

impl RunOutcome {
    /// Map a provider conclusion string (`success`, `failure`, ...)
    pub fn from_conclusion(conclusion: Option<&str>) -> Self {
        match conclusion.map(str::to_ascii_lowercase).as_deref() {
            Some("success") => Self::Success,
            Some("failure" | "timed_out" | "startup_failure" | "cancelled" | "action_required") => {
                Self::Failure
            }
            _ => Self::Unknown,
        }
    }
}

/// The most recent scheduled run of a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Provider-specific run ID
    pub id: u64,
    /// When the schedule fired
    pub created_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    /// Web URL to the run
    pub html_url: String,
}

/// Whether the provider will fire the workflow's schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    Active,
    /// Disabled manually, for inactivity, on a fork, ...
    Disabled { reason: String },
    Deleted,
}

impl ScheduleState {
    /// Map a provider workflow `state` string
    pub fn from_provider_state(state: &str) -> Self {
        match state {
            "active" => Self::Active,
            "deleted" => Self::Deleted,
            other => Self::Disabled {
                reason: other.to_string(),
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Workflow definition as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInfo {
    pub name: String,
    /// Path of the definition inside the repository
    pub path: String,
    pub state: ScheduleState,
    /// Web URL of the definition file
    pub html_url: String,
}

impl WorkflowInfo {
    /// Link to the workflow's Actions page, where a disabled schedule can be
    /// re-enabled.
    ///
    /// The API does not return this URL, so it is derived from the
    /// definition's `.../blob/<ref>/<path>` URL. Falls back to `html_url`
    /// when that shape is not recognized.
    pub fn actions_url(&self) -> String {
        let file = self.path.rsplit('/').next().unwrap_or_default();
        match self.html_url.split_once("/blob/") {
            Some((repo_url, _)) if !file.is_empty() => {
                format!("{repo_url}/actions/workflows/{file}")
            }
            _ => self.html_url.clone(),
        }
    }
}

/// Everything fetched for one job in one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub schedule: ScheduleState,
    /// `None` if the schedule has never fired
    pub last_run: Option<RunSummary>,
    pub workflow_url: Option<String>,
}

impl RunRecord {
    pub fn enabled(&self) -> bool {
        self.schedule.is_enabled()
    }

    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        self.last_run.as_ref().map(|run| run.created_at)
    }
}

/// Health of a scheduled job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Active,
    Inactive,
    Failing,
    Unknown,
}

impl HealthState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Failing => "failing",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of checking one job; per-job provider errors become sentinels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Checked {
        record: RunRecord,
        health: HealthState,
    },
    /// Repository or workflow file does not exist (or is not visible)
    NotFound,
    /// Transient or unexpected provider failure
    Unavailable { reason: String },
}

impl JobOutcome {
    /// Health used for counting; sentinels count as unknown
    pub fn health(&self) -> HealthState {
        match self {
            Self::Checked { health, .. } => *health,
            Self::NotFound | Self::Unavailable { .. } => HealthState::Unknown,
        }
    }

    /// Row label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            other => other.health().label(),
        }
    }

    pub fn record(&self) -> Option<&RunRecord> {
        match self {
            Self::Checked { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: JobRef,
    pub outcome: JobOutcome,
}

/// Checked jobs of one repository, in config order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReport {
    pub repository: RepositoryRef,
    pub jobs: Vec<JobReport>,
}
