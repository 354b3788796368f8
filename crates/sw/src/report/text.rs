//! Plain-text report

use super::{job_link, Summary};
use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use schedwatch_core::text::{column_width, format_age};
use schedwatch_monitor::{HealthState, JobOutcome, RepositoryReport, ScheduleState};
use std::fmt::{self, Write};

/// Row shown for a repository with an empty job list
const NO_JOBS: &str = "(no jobs configured)";

/// Width of the widest label, `not found`
const LABEL_WIDTH: usize = 9;

/// Render the text report: one block per repository, the summary line, then
/// links for inactive workflows and failed runs.
pub fn render_text(
    reports: &[RepositoryReport],
    summary: &Summary,
    now: DateTime<Utc>,
    color: bool,
) -> Result<String, fmt::Error> {
    let width = column_width(reports.iter().flat_map(|r| {
        let names = r.jobs.iter().map(|j| j.job.as_str());
        names.chain(r.jobs.is_empty().then_some(NO_JOBS))
    }));

    let mut out = String::new();
    for report in reports {
        writeln!(out, "{}", report.repository)?;
        if report.jobs.is_empty() {
            write_row(&mut out, NO_JOBS, width, "unknown", HealthState::Unknown, "", color)?;
        }
        for job in &report.jobs {
            write_row(
                &mut out,
                job.job.as_str(),
                width,
                job.outcome.label(),
                job.outcome.health(),
                &detail(&job.outcome, now),
                color,
            )?;
        }
    }

    if !reports.is_empty() {
        writeln!(out)?;
    }
    writeln!(out, "{summary}")?;

    write_links(&mut out, reports, HealthState::Inactive, "Inactive workflows")?;
    write_links(&mut out, reports, HealthState::Failing, "Failed runs")?;
    Ok(out)
}

fn write_row(
    out: &mut String,
    name: &str,
    width: usize,
    label: &str,
    health: HealthState,
    detail: &str,
    color: bool,
) -> fmt::Result {
    if detail.is_empty() {
        writeln!(out, "  {name:<width$}  {}", paint(label, health, color))
    } else {
        let label = format!("{label:<LABEL_WIDTH$}");
        writeln!(out, "  {name:<width$}  {}  {detail}", paint(&label, health, color))
    }
}

fn paint(text: &str, health: HealthState, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    let c = match health {
        HealthState::Active => Color::Green,
        HealthState::Inactive => Color::Yellow,
        HealthState::Failing => Color::Red,
        HealthState::Unknown => Color::DarkGrey,
    };
    text.with(c).to_string()
}

fn detail(outcome: &JobOutcome, now: DateTime<Utc>) -> String {
    match outcome {
        JobOutcome::Checked { record, .. } => {
            let mut parts = vec![match record.last_run_at() {
                Some(at) => format!("last run {}", format_age(at, now)),
                None => "never run".to_string(),
            }];
            match &record.schedule {
                ScheduleState::Active => {}
                ScheduleState::Disabled { reason } => parts.push(format!("schedule {reason}")),
                ScheduleState::Deleted => parts.push("workflow deleted".to_string()),
            }
            parts.join(", ")
        }
        JobOutcome::NotFound => String::new(),
        JobOutcome::Unavailable { reason } => reason.clone(),
    }
}

fn write_links(
    out: &mut String,
    reports: &[RepositoryReport],
    health: HealthState,
    heading: &str,
) -> fmt::Result {
    let mut rows = reports.iter().flat_map(|r| {
        r.jobs
            .iter()
            .filter(move |j| j.outcome.health() == health)
            .map(move |j| (&r.repository, j))
    });

    let Some(first) = rows.next() else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "{heading}:")?;
    for (repository, job) in std::iter::once(first).chain(rows) {
        match job_link(&job.outcome) {
            Some(url) => writeln!(out, "  {repository} {}: {url}", job.job)?,
            None => writeln!(out, "  {repository} {}", job.job)?,
        }
    }
    Ok(())
}
