//! Response types for the platform's REST API.
//!
//! All endpoints are called with `envelope=false` where supported. Single
//! resources (goal, project, planner) come back wrapped in `{"item": {...}}`;
//! collections (jobs, latest journey status) come back as a JSON object keyed
//! by id, which is why [`crate::normalize`] walks them as maps rather than
//! deserializing into a `Vec`.
//!
//! Every field is optional or defaulted: a missing counter means zero and a
//! missing timestamp makes the entry unusable, which is decided during
//! normalization rather than here.

use serde::Deserialize;

/// `{"item": {...}}` wrapper used by single-resource endpoints.
#[derive(Debug, Deserialize)]
pub struct ItemEnvelope<T> {
    pub item: T,
}

// ---------------------------------------------------------------------------
// GET /plans/executions/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerItem {
    #[serde(default)]
    pub name: Option<String>,
    /// Epoch milliseconds of the next scheduled run.
    #[serde(default)]
    pub next_schedule_execution: Option<i64>,
}

// ---------------------------------------------------------------------------
// GET /goals/{id}, GET /projects/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NamedItem {
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/jobs
// ---------------------------------------------------------------------------

/// One value of the jobs mapping.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJob {
    /// Epoch milliseconds.
    #[serde(default)]
    pub submit_date: Option<i64>,
    #[serde(default)]
    pub goal_id: Option<i64>,
    #[serde(default)]
    pub plan_id: Option<i64>,
    /// Some responses nest the plan instead of exposing `planId`.
    #[serde(default)]
    pub plan: Option<PlanRef>,
    #[serde(default)]
    pub total_test_executions: Option<i64>,
    #[serde(default)]
    pub successful_test_executions: Option<i64>,
    /// Numeric or string depending on the API version.
    #[serde(default)]
    pub snapshot_id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PlanRef {
    #[serde(default)]
    pub id: Option<i64>,
}

// ---------------------------------------------------------------------------
// GET /testsuites/latest_status
// ---------------------------------------------------------------------------

/// One value of the latest-status mapping (one journey of the goal).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestStatusEntry {
    #[serde(default)]
    pub journey: Option<JourneyRef>,
    #[serde(default)]
    pub last_execution: Option<LastExecution>,
}

#[derive(Debug, Deserialize)]
pub struct JourneyRef {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    /// Free-form tag objects; some carry a `projectId`.
    #[serde(default)]
    pub tags: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct LastExecution {
    #[serde(default)]
    pub statistics: Option<ExecutionStatistics>,
}

#[derive(Debug, Deserialize)]
pub struct ExecutionStatistics {
    /// `"PASS"`, `"FAIL"`, `"ERROR"`, ...
    #[serde(default)]
    pub outcome: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /projects/{id}/executions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ExecutionsResponse {
    #[serde(default)]
    pub items: Vec<RawExecution>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecution {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub submit_date: Option<i64>,
    #[serde(default)]
    pub total_tests: Option<i64>,
    #[serde(default)]
    pub total_passes: Option<i64>,
}
