//! JSON report

use super::{job_link, Summary};
use chrono::{DateTime, SecondsFormat, Utc};
use schedwatch_monitor::{JobOutcome, JobReport, RepositoryReport, RunRecord};
use serde_json::{json, Value};

/// Render the report as one pretty-printed JSON document
pub fn render_json(
    reports: &[RepositoryReport],
    summary: &Summary,
    now: DateTime<Utc>,
) -> serde_json::Result<String> {
    let repositories: Vec<Value> = reports
        .iter()
        .map(|r| {
            json!({
                "repository": r.repository,
                "jobs": r.jobs.iter().map(job_json).collect::<Vec<_>>(),
            })
        })
        .collect();

    let document = json!({
        "checked_at": timestamp(now),
        "repositories": repositories,
        "summary": summary,
    });
    let mut out = serde_json::to_string_pretty(&document)?;
    out.push('\n');
    Ok(out)
}

fn job_json(job: &JobReport) -> Value {
    let record = job.outcome.record();
    let last_run = record.and_then(|r| r.last_run.as_ref());
    let error = match &job.outcome {
        JobOutcome::Unavailable { reason } => Some(reason.as_str()),
        _ => None,
    };

    json!({
        "job": job.job,
        "status": status_key(&job.outcome),
        "enabled": record.map(RunRecord::enabled),
        "last_run_at": last_run.map(|run| timestamp(run.created_at)),
        "last_run_outcome": last_run.map(|run| run.outcome),
        "url": job_link(&job.outcome),
        "error": error,
    })
}

fn status_key(outcome: &JobOutcome) -> &'static str {
    match outcome {
        JobOutcome::NotFound => "not_found",
        other => other.health().label(),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use chrono::Duration;
    use schedwatch_monitor::{HealthState, RunOutcome, ScheduleState};

    #[test]
    fn test_json_document_shape() {
        let reports = vec![repo(
            "octo/repo",
            vec![
                (
                    "nightly.yml",
                    checked(
                        ScheduleState::Active,
                        Some(Duration::days(1)),
                        RunOutcome::Failure,
                        HealthState::Failing,
                    ),
                ),
                ("gone.yml", JobOutcome::NotFound),
                (
                    "flaky.yml",
                    JobOutcome::Unavailable {
                        reason: "provider temporarily unavailable: HTTP 503".to_string(),
                    },
                ),
            ],
        )];
        let summary = Summary::from_reports(&reports);

        let out = render_json(&reports, &summary, now()).unwrap();
        let doc: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(doc["checked_at"], "2026-03-01T12:00:00Z");
        assert_eq!(doc["summary"]["total"], 3);
        assert_eq!(doc["summary"]["failing"], 1);
        assert_eq!(doc["summary"]["not_found"], 1);

        let repo = &doc["repositories"][0];
        assert_eq!(repo["repository"], "octo/repo");

        let nightly = &repo["jobs"][0];
        assert_eq!(nightly["job"], "nightly.yml");
        assert_eq!(nightly["status"], "failing");
        assert_eq!(nightly["enabled"], true);
        assert_eq!(nightly["last_run_at"], "2026-02-28T12:00:00Z");
        assert_eq!(nightly["last_run_outcome"], "failure");
        assert_eq!(nightly["url"], "https://github.com/octo/repo/actions/runs/42");
        assert!(nightly["error"].is_null());

        let gone = &repo["jobs"][1];
        assert_eq!(gone["status"], "not_found");
        assert!(gone["enabled"].is_null());
        assert!(gone["url"].is_null());

        let flaky = &repo["jobs"][2];
        assert_eq!(flaky["status"], "unknown");
        assert_eq!(flaky["error"], "provider temporarily unavailable: HTTP 503");
    }

    #[test]
    fn test_json_is_never_colored() {
        let reports = vec![repo("octo/empty", vec![])];
        let out = render_json(&reports, &Summary::from_reports(&reports), now()).unwrap();
        assert!(!out.contains('\u{1b}'));
        assert!(out.ends_with("}\n"));
    }
}
