//! HTTP client for the platform's REST API.
//!
//! Wraps `reqwest` with bearer-token auth, status mapping (401 is surfaced as
//! [`ApiError::Unauthorized`]) and typed response handling. Every call is a
//! single GET; there are no retries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use vqstats_core::{JobPage, JourneyOutcomes, MatchWindow, ScheduledExecution};

use crate::error::ApiError;
use crate::normalize;
use crate::types::{ExecutionsResponse, ItemEnvelope, NamedItem, PlannerItem};

const DEFAULT_BASE_URL: &str = "https://api.virtuoso.qa/api";

/// Journey inventory for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalJourneys {
    pub count: u64,
    /// Project id found in the journeys' tags, if any.
    pub project_id: Option<i64>,
}

/// Planner metadata from `GET /plans/executions/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerInfo {
    pub planner_id: i64,
    pub name: Option<String>,
    pub next_execution: Option<DateTime<Utc>>,
}

impl PlannerInfo {
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Planner {}", self.planner_id))
    }

    /// The next scheduled run, if the planner has one.
    #[must_use]
    pub fn scheduled(&self) -> Option<ScheduledExecution> {
        self.next_execution.map(|scheduled_time| ScheduledExecution {
            plan_id: self.planner_id,
            plan_name: self.name.clone(),
            scheduled_time,
        })
    }
}

/// One entry of `GET /projects/{id}/executions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub id: String,
    pub submit_time: Option<DateTime<Utc>>,
    pub total_tests: i64,
    pub total_passes: i64,
}

/// Client for the platform's REST API.
///
/// Use [`VirtuosoClient::new`] for production or
/// [`VirtuosoClient::with_base_url`] to point at a mock server in tests.
pub struct VirtuosoClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl VirtuosoClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL, token, timeout_secs, user_agent)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url`
    /// is not an absolute http(s) URL.
    pub fn with_base_url(
        base_url: &str,
        token: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash, so `Url::join` appends to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: "expected an http(s) URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url: parsed,
        })
    }

    /// Counts a goal's journeys and finds the project they are tagged with.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] on HTTP 401.
    /// - [`ApiError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ApiError::Http`] on network failure.
    /// - [`ApiError::Deserialize`] if the body is not a JSON object.
    pub async fn goal_journeys(&self, goal_id: i64) -> Result<GoalJourneys, ApiError> {
        let goal = goal_id.to_string();
        let url = self.build_url(
            "testsuites/latest_status",
            &[("goalId", &goal), ("envelope", "false")],
        )?;
        let body: Map<String, Value> = self.get_typed(&url).await?;
        Ok(GoalJourneys {
            count: normalize::count_journeys(&body),
            project_id: normalize::project_id_from_tags(&body),
        })
    }

    /// Number of journeys currently defined for a goal.
    ///
    /// # Errors
    ///
    /// Same as [`Self::goal_journeys`].
    pub async fn count_journeys(&self, goal_id: i64) -> Result<u64, ApiError> {
        Ok(self.goal_journeys(goal_id).await?.count)
    }

    /// Passed and failed journey titles for a goal at a given snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`Self::goal_journeys`].
    pub async fn journey_outcomes(
        &self,
        snapshot_id: &str,
        goal_id: i64,
    ) -> Result<JourneyOutcomes, ApiError> {
        let goal = goal_id.to_string();
        let url = self.build_url(
            "testsuites/latest_status",
            &[
                ("snapshotId", snapshot_id),
                ("goalId", &goal),
                ("envelope", "false"),
            ],
        )?;
        let body: Map<String, Value> = self.get_typed(&url).await?;
        Ok(normalize::journey_outcomes(&body))
    }

    /// Planner name and next scheduled run.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] / [`ApiError::UnexpectedStatus`] /
    ///   [`ApiError::Http`] as for every request.
    /// - [`ApiError::Deserialize`] if the body has no `item` object.
    pub async fn planner(&self, planner_id: i64) -> Result<PlannerInfo, ApiError> {
        let url = self.build_url(&format!("plans/executions/{planner_id}"), &[])?;
        let envelope: ItemEnvelope<PlannerItem> = self.get_typed(&url).await?;
        Ok(PlannerInfo {
            planner_id,
            name: envelope.item.name,
            next_execution: envelope
                .item
                .next_schedule_execution
                .and_then(normalize::millis_to_utc),
        })
    }

    /// The planner's next scheduled run.
    ///
    /// # Errors
    ///
    /// As [`Self::planner`], plus [`ApiError::MissingField`] when the planner
    /// has no `nextScheduleExecution`.
    pub async fn next_execution(&self, planner_id: i64) -> Result<ScheduledExecution, ApiError> {
        self.planner(planner_id)
            .await?
            .scheduled()
            .ok_or_else(|| ApiError::MissingField {
                context: format!("planner {planner_id}"),
                field: "item.nextScheduleExecution",
            })
    }

    /// Display name of a goal.
    ///
    /// # Errors
    ///
    /// As for every request, plus [`ApiError::MissingField`] when the goal
    /// has no `item.name`.
    pub async fn goal_name(&self, goal_id: i64) -> Result<String, ApiError> {
        self.item_name(&format!("goals/{goal_id}"), format!("goal {goal_id}"))
            .await
    }

    /// Display name of a project.
    ///
    /// # Errors
    ///
    /// As [`Self::goal_name`].
    pub async fn project_name(&self, project_id: i64) -> Result<String, ApiError> {
        self.item_name(
            &format!("projects/{project_id}"),
            format!("project {project_id}"),
        )
        .await
    }

    /// One page of jobs for a plan, restricted to the window's date range.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] / [`ApiError::UnexpectedStatus`] /
    ///   [`ApiError::Http`] as for every request.
    /// - [`ApiError::Deserialize`] if the body is not valid JSON.
    pub async fn jobs_page(
        &self,
        project_id: i64,
        plan_id: i64,
        window: &MatchWindow,
        last_id: Option<&str>,
    ) -> Result<JobPage, ApiError> {
        let (begin, end) = window.epoch_millis();
        let (begin, end, plan) = (begin.to_string(), end.to_string(), plan_id.to_string());
        let mut params = vec![
            ("dateBegin", begin.as_str()),
            ("dateEnd", end.as_str()),
            ("planIds[]", plan.as_str()),
            ("envelope", "false"),
        ];
        if let Some(last_id) = last_id {
            params.push(("lastId", last_id));
        }

        let url = self.build_url(&format!("projects/{project_id}/jobs"), &params)?;
        let body = self.request_json(&url).await?;
        Ok(normalize::job_page(&body))
    }

    /// All executions listed for a project.
    ///
    /// # Errors
    ///
    /// As for every request, plus [`ApiError::Deserialize`] if `items` is not
    /// a list of executions.
    pub async fn project_executions(
        &self,
        project_id: i64,
    ) -> Result<Vec<ExecutionSummary>, ApiError> {
        let url = self.build_url(&format!("projects/{project_id}/executions"), &[])?;
        let response: ExecutionsResponse = self.get_typed(&url).await?;
        Ok(response
            .items
            .into_iter()
            .filter_map(|raw| {
                Some(ExecutionSummary {
                    id: normalize::id_to_string(&raw.id)?,
                    submit_time: raw.submit_date.and_then(normalize::millis_to_utc),
                    total_tests: raw.total_tests.unwrap_or(0),
                    total_passes: raw.total_passes.unwrap_or(0),
                })
            })
            .collect())
    }

    async fn item_name(&self, path: &str, context: String) -> Result<String, ApiError> {
        let url = self.build_url(path, &[])?;
        let envelope: ItemEnvelope<NamedItem> = self.get_typed(&url).await?;
        envelope
            .item
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ApiError::MissingField {
                context,
                field: "item.name",
            })
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_typed<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        let body = self.request_json(url).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }

    /// Sends an authenticated GET and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on 401, [`ApiError::UnexpectedStatus`]
    /// on any other non-2xx status, [`ApiError::Http`] on network failure and
    /// [`ApiError::Deserialize`] if the body is not valid JSON.
    async fn request_json(&self, url: &Url) -> Result<Value, ApiError> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
