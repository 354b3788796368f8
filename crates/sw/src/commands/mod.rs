//! CLI definition and the check flow

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use schedwatch_core::config::TOKEN_ENV_VAR;
use schedwatch_core::{Credential, WatchConfig};
use schedwatch_monitor::{
    check_all, CheckOptions, GitHubActionsProvider, ScheduleProvider, DEFAULT_API_URL,
    DEFAULT_STALE_AFTER_DAYS, MAX_CONCURRENCY,
};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::report::{self, OutputFormat, Summary};

/// Exit code for `--strict` when some job is not active
const EXIT_UNHEALTHY: i32 = 3;

/// schedwatch - dashboard for neglected scheduled GitHub Actions workflows
#[derive(Parser, Debug)]
#[command(
    name = "schedwatch",
    version,
    about = "Dashboard for neglected scheduled GitHub Actions workflows",
    long_about = "Checks every workflow listed in a YAML watch list and reports whether its \
                  schedule is active, inactive (disabled or stale), failing, or unknown.\n\n\
                  The watch list maps 'owner/name' keys to lists of workflow file names. \
                  The reserved key 'token' may hold the GitHub token."
)]
pub struct Cli {
    /// YAML watch list
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// GitHub token (overrides the config file and GITHUB_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Days without a scheduled run before a workflow counts as inactive
    #[arg(
        long,
        value_name = "DAYS",
        default_value_t = DEFAULT_STALE_AFTER_DAYS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    stale_after: u32,

    /// GitHub API base URL
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Number of jobs checked at the same time
    #[arg(
        long,
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=MAX_CONCURRENCY as i64)
    )]
    concurrency: u8,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with status 3 when any job is not active
    #[arg(long)]
    strict: bool,
}

/// How the process exits after a completed check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Unhealthy,
}

impl ExitStatus {
    fn from_summary(strict: bool, summary: &Summary) -> Self {
        if strict && !summary.all_active() {
            Self::Unhealthy
        } else {
            Self::Success
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Unhealthy => EXIT_UNHEALTHY,
        }
    }
}

impl Cli {
    /// Execute the check
    pub fn execute(self) -> Result<ExitStatus> {
        let config = WatchConfig::load(&self.config)?;
        debug!(
            path = %config.path().display(),
            repositories = config.repositories().len(),
            jobs = config.job_count(),
            "loaded watch list"
        );

        // Resolved before the provider exists, so a missing token never
        // reaches the network.
        let env_token = std::env::var(TOKEN_ENV_VAR).ok();
        let credential = config.credential(self.token.as_deref(), env_token.as_deref())?;
        debug!(source = %credential.source(), "resolved credential");

        let provider = GitHubActionsProvider::new(&self.api_url)?;
        let options = CheckOptions::new(Utc::now())
            .with_stale_after(Duration::days(i64::from(self.stale_after)))
            .with_concurrency(usize::from(self.concurrency));
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text {
                color: use_color(self.no_color),
            }
        };

        let (output, summary) = run_check(&provider, &config, &credential, &options, format)?;

        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .and_then(|()| stdout.flush())
            .context("failed to write report")?;

        Ok(ExitStatus::from_summary(self.strict, &summary))
    }
}

/// Check every configured job and render the report.
///
/// Nothing is written here: the caller prints the finished buffer.
pub(crate) fn run_check<P: ScheduleProvider + ?Sized>(
    provider: &P,
    config: &WatchConfig,
    credential: &Credential,
    options: &CheckOptions,
    format: OutputFormat,
) -> Result<(String, Summary)> {
    let reports = check_all(provider, config.repositories(), credential, options)?;
    let summary = Summary::from_reports(&reports);
    info!(
        total = summary.total,
        active = summary.active,
        inactive = summary.inactive,
        failing = summary.failing,
        "check complete"
    );

    let output = report::render(&reports, &summary, options.now, format)?;
    Ok((output, summary))
}

fn use_color(no_color: bool) -> bool {
    !no_color
        && std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty())
        && std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use clap::CommandFactory;
    use schedwatch_core::CredentialSource;
    use schedwatch_monitor::{
        create_test_run, create_test_workflow, MockCall, MockFailure, MockScheduleProvider,
        RunOutcome, ScheduleState,
    };
    use std::path::Path;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn config(yaml: &str) -> WatchConfig {
        WatchConfig::from_yaml_str(yaml, Path::new("watch.yml")).unwrap()
    }

    fn credential() -> Credential {
        Credential::new("t0k3n", CredentialSource::CommandLine)
    }

    fn text() -> OutputFormat {
        OutputFormat::Text { color: false }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["schedwatch", "watch.yml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("watch.yml"));
        assert_eq!(cli.stale_after, DEFAULT_STALE_AFTER_DAYS);
        assert_eq!(cli.concurrency, 1);
        assert!(cli.token.is_none());
        assert!(!cli.json && !cli.no_color && !cli.strict);
    }

    #[test]
    fn test_cli_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["schedwatch", "w.yml", "--concurrency", "0"]).is_err());
        assert!(Cli::try_parse_from(["schedwatch", "w.yml", "--concurrency", "17"]).is_err());
        assert!(Cli::try_parse_from(["schedwatch", "w.yml", "--stale-after", "0"]).is_err());
        assert!(Cli::try_parse_from(["schedwatch"]).is_err());
    }

    #[test]
    fn test_stale_success_renders_inactive() {
        let provider = MockScheduleProvider::new().with_job(
            "octo/repo",
            "nightly.yml",
            create_test_workflow("octo/repo", "nightly.yml", ScheduleState::Active),
            Some(create_test_run(7, now() - Duration::days(400), RunOutcome::Success)),
        );
        let config = config("octo/repo:\n  - nightly.yml\n");

        let (out, summary) =
            run_check(&provider, &config, &credential(), &CheckOptions::new(now()), text())
                .unwrap();

        assert!(out.contains("  nightly.yml  inactive   last run 400 days ago\n"));
        assert!(out.contains("https://github.com/octo/repo/actions/workflows/nightly.yml"));
        assert_eq!(summary.inactive, 1);
        assert_eq!(ExitStatus::from_summary(false, &summary), ExitStatus::Success);
        assert_eq!(ExitStatus::from_summary(true, &summary).code(), 3);
    }

    #[test]
    fn test_missing_workflow_renders_not_found_row() {
        let provider = MockScheduleProvider::new().with_job(
            "octo/repo",
            "nightly.yml",
            create_test_workflow("octo/repo", "nightly.yml", ScheduleState::Active),
            Some(create_test_run(7, now() - Duration::hours(6), RunOutcome::Success)),
        );
        let config = config("octo/repo:\n  - nightly.yml\n  - missing.yml\n");

        let (out, summary) =
            run_check(&provider, &config, &credential(), &CheckOptions::new(now()), text())
                .unwrap();

        let expected = "\
octo/repo
  nightly.yml  active     last run 6 hours ago
  missing.yml  not found

Checked 2 workflows: 1 active, 0 inactive, 0 failing, 0 unknown, 1 not found.
";
        assert_eq!(out, expected);
        assert_eq!(ExitStatus::from_summary(false, &summary).code(), 0);
    }

    #[test]
    fn test_transient_failure_keeps_other_rows() {
        let provider = MockScheduleProvider::new()
            .with_job_failure("octo/repo", "flaky.yml", MockFailure::RateLimited)
            .with_job(
                "octo/repo",
                "nightly.yml",
                create_test_workflow("octo/repo", "nightly.yml", ScheduleState::Active),
                Some(create_test_run(9, now() - Duration::days(2), RunOutcome::Failure)),
            );
        let config = config("octo/repo:\n  - flaky.yml\n  - nightly.yml\n");

        let (out, summary) =
            run_check(&provider, &config, &credential(), &CheckOptions::new(now()), text())
                .unwrap();

        assert!(out.contains("  flaky.yml    unknown    provider temporarily unavailable"));
        assert!(out.contains("  nightly.yml  failing    last run 2 days ago\n"));
        assert!(out.contains("Failed runs:\n  octo/repo nightly.yml: "));
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.failing, 1);
    }

    #[test]
    fn test_bad_credentials_abort_without_output() {
        let provider = MockScheduleProvider::new()
            .with_job(
                "octo/repo",
                "nightly.yml",
                create_test_workflow("octo/repo", "nightly.yml", ScheduleState::Active),
                None,
            )
            .with_expected_token("someone-else");
        let config = config("octo/repo:\n  - nightly.yml\n  - weekly.yml\n");

        let err = run_check(&provider, &config, &credential(), &CheckOptions::new(now()), text())
            .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("cannot continue"), "{message}");
        assert!(message.contains("Bad credentials"), "{message}");
        assert!(!message.contains("t0k3n"));
        assert_eq!(
            provider.get_calls(),
            vec![MockCall::GetWorkflow {
                repository: "octo/repo".to_string(),
                job: "nightly.yml".to_string(),
            }]
        );
    }

    #[test]
    fn test_json_output_with_concurrency() {
        let mut provider = MockScheduleProvider::new();
        let mut yaml = String::from("octo/repo:\n");
        for i in 0..6 {
            let file = format!("job{i}.yml");
            provider = provider.with_job(
                "octo/repo",
                &file,
                create_test_workflow("octo/repo", &file, ScheduleState::Active),
                Some(create_test_run(i, now() - Duration::days(1), RunOutcome::Success)),
            );
            yaml.push_str(&format!("  - {file}\n"));
        }
        let config = config(&yaml);
        let options = CheckOptions::new(now()).with_concurrency(4);

        let (out, summary) =
            run_check(&provider, &config, &credential(), &options, OutputFormat::Json).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
        let jobs = doc["repositories"][0]["jobs"].as_array().unwrap();
        let names: Vec<&str> = jobs.iter().map(|j| j["job"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            ["job0.yml", "job1.yml", "job2.yml", "job3.yml", "job4.yml", "job5.yml"]
        );
        assert!(summary.all_active());
    }
}
