//! GitHub Actions provider using the REST API

use super::error::ProviderError;
use super::provider::ScheduleProvider;
use super::types::{RunOutcome, RunSummary, ScheduleState, WorkflowInfo};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use schedwatch_core::{Credential, JobRef, RepositoryRef};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Public GitHub API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// GitHub Actions provider backed by a blocking HTTP client
#[derive(Debug, Clone)]
pub struct GitHubActionsProvider {
    client: Client,
    api_url: Url,
}

impl GitHubActionsProvider {
    /// Create a provider for the API rooted at `api_url`
    /// (`https://api.github.com`, or `https://<host>/api/v3` for Enterprise).
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Setup` if the URL is not an absolute http(s)
    /// URL or the HTTP client cannot be built.
    pub fn new(api_url: &str) -> Result<Self, ProviderError> {
        let api_url = Url::parse(api_url).map_err(|e| ProviderError::Setup {
            message: format!("invalid API URL '{api_url}': {e}"),
            source: Some(Box::new(e)),
        })?;
        if api_url.cannot_be_a_base() || !matches!(api_url.scheme(), "http" | "https") {
            return Err(ProviderError::Setup {
                message: format!("API URL '{api_url}' must be an http(s) URL"),
                source: None,
            });
        }

        let client = Client::builder()
            .user_agent(concat!("schedwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Setup {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, api_url })
    }

    /// `{api}/repos/{owner}/{name}/actions/workflows/{job}[/{extra}]`
    fn workflow_endpoint(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        extra: Option<&str>,
    ) -> Result<Url, ProviderError> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| ProviderError::Setup {
                message: format!("API URL '{}' cannot be extended", self.api_url),
                source: None,
            })?;
            segments.pop_if_empty().extend([
                "repos",
                repo.owner(),
                repo.name(),
                "actions",
                "workflows",
                job.as_str(),
            ]);
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        Ok(url)
    }

    /// Issue an authenticated GET and decode the JSON body
    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        credential: &Credential,
        resource: &str,
    ) -> Result<T, ProviderError> {
        debug!(%url, provider = self.provider_name(), "querying provider");

        let response = self
            .client
            .get(url)
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", credential.expose()))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION)
            .send()
            .map_err(|e| ProviderError::Transient {
                message: format!("request for {resource} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().map_err(|e| ProviderError::Transient {
            message: format!("failed to read response for {resource}: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(Self::error_for_status(status, &headers, &body, resource));
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Unexpected {
            message: format!("failed to parse response for {resource}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Map a non-success response onto the error taxonomy
    fn error_for_status(
        status: StatusCode,
        headers: &HeaderMap,
        body: &str,
        resource: &str,
    ) -> ProviderError {
        let message = serde_json::from_str::<GhErrorBody>(body)
            .map(|b| b.message)
            .unwrap_or_else(|_| status.to_string());

        match status.as_u16() {
            404 => ProviderError::NotFound {
                resource: resource.to_string(),
            },
            403 if Self::is_rate_limited(headers) => ProviderError::Transient {
                message: format!("rate limited: {message}"),
                source: None,
            },
            401 | 403 => ProviderError::Authentication {
                status: status.as_u16(),
                message,
            },
            429 => ProviderError::Transient {
                message: format!("rate limited: {message}"),
                source: None,
            },
            500..=599 => ProviderError::Transient {
                message: format!("HTTP {}: {message}", status.as_u16()),
                source: None,
            },
            code => ProviderError::Unexpected {
                message: format!("HTTP {code} for {resource}: {message}"),
                source: None,
            },
        }
    }

    /// GitHub signals exhausted primary and secondary rate limits on 403
    fn is_rate_limited(headers: &HeaderMap) -> bool {
        let exhausted = headers
            .get(RATE_LIMIT_REMAINING_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        exhausted || headers.contains_key(RETRY_AFTER)
    }

    fn resource(repo: &RepositoryRef, job: &JobRef) -> String {
        format!("workflow '{job}' in {repo}")
    }
}

impl ScheduleProvider for GitHubActionsProvider {
    fn get_workflow(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<WorkflowInfo, ProviderError> {
        let url = self.workflow_endpoint(repo, job, None)?;
        let workflow: GhWorkflow =
            self.get_json(url, &[], credential, &Self::resource(repo, job))?;

        Ok(WorkflowInfo {
            name: workflow.name,
            path: workflow.path,
            state: ScheduleState::from_provider_state(&workflow.state),
            html_url: workflow.html_url,
        })
    }

    fn latest_scheduled_run(
        &self,
        repo: &RepositoryRef,
        job: &JobRef,
        credential: &Credential,
    ) -> Result<Option<RunSummary>, ProviderError> {
        let url = self.workflow_endpoint(repo, job, Some("runs"))?;
        let runs: GhRunList = self.get_json(
            url,
            &[("event", "schedule"), ("per_page", "1")],
            credential,
            &Self::resource(repo, job),
        )?;

        debug!(
            repository = %repo,
            job = %job,
            total_count = runs.total_count,
            "listed scheduled runs"
        );

        Ok(runs.workflow_runs.into_iter().next().map(|run| RunSummary {
            id: run.id,
            created_at: run.created_at,
            outcome: RunOutcome::from_conclusion(run.conclusion.as_deref()),
            html_url: run.html_url,
        }))
    }

    fn provider_name(&self) -> &str {
        "GitHub Actions"
    }
}

/// `GET /repos/{owner}/{repo}/actions/workflows/{workflow_id}`
#[derive(Debug, Deserialize)]
struct GhWorkflow {
    name: String,
    path: String,
    state: String,
    html_url: String,
}

/// `GET /repos/{owner}/{repo}/actions/workflows/{workflow_id}/runs`
#[derive(Debug, Deserialize)]
struct GhRunList {
    #[serde(default)]
    total_count: u64,
    workflow_runs: Vec<GhRun>,
}

#[derive(Debug, Deserialize)]
struct GhRun {
    id: u64,
    conclusion: Option<String>,
    created_at: DateTime<Utc>,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct GhErrorBody {
    message: String,
}
