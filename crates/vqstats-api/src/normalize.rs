//! Normalization of API responses into `vqstats-core` types.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use vqstats_core::{JobPage, JobRecord, JourneyOutcomes};

use crate::types::{LatestStatusEntry, RawJob};

/// Converts epoch milliseconds into a UTC instant.
#[must_use]
pub fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

/// Renders an id that may arrive as a JSON number or string.
#[must_use]
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Converts one entry of the jobs mapping into a [`JobRecord`].
///
/// Returns `None` for entries without a usable submit date or goal id.
#[must_use]
pub fn normalize_job(job_id: &str, value: &Value) -> Option<JobRecord> {
    let raw: RawJob = match serde_json::from_value(value.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(job_id, error = %e, "skipping job with unexpected shape");
            return None;
        }
    };

    let Some(submit_time) = raw.submit_date.and_then(millis_to_utc) else {
        tracing::debug!(job_id, "skipping job without submitDate");
        return None;
    };
    let Some(goal_id) = raw.goal_id else {
        tracing::debug!(job_id, "skipping job without goalId");
        return None;
    };

    Some(JobRecord {
        job_id: job_id.to_owned(),
        goal_id,
        plan_id: raw.plan_id.or_else(|| raw.plan.and_then(|p| p.id)),
        submit_time,
        executed_count: raw.total_test_executions.unwrap_or(0),
        passed_count: raw.successful_test_executions.unwrap_or(0),
        snapshot_id: raw.snapshot_id.as_ref().and_then(id_to_string),
    })
}

/// Converts a jobs response body into a [`JobPage`].
///
/// A body that is not a JSON object yields an empty page, which ends
/// pagination. `raw_len` and `last_id` count every entry, malformed or not,
/// so the cursor keeps advancing past entries that were skipped.
#[must_use]
pub fn job_page(body: &Value) -> JobPage {
    let Some(map) = body.as_object() else {
        tracing::warn!("jobs response is not an object; treating as last page");
        return JobPage::default();
    };

    let mut page = JobPage {
        records: Vec::with_capacity(map.len()),
        raw_len: map.len(),
        last_id: None,
    };
    for (job_id, value) in map {
        if let Some(record) = normalize_job(job_id, value) {
            page.records.push(record);
        }
        page.last_id = Some(job_id.clone());
    }
    page
}

fn status_entries(body: &Map<String, Value>) -> impl Iterator<Item = LatestStatusEntry> + '_ {
    body.values()
        .filter_map(|v| serde_json::from_value::<LatestStatusEntry>(v.clone()).ok())
}

/// Counts the journeys in a latest-status response (entries whose journey
/// carries an id).
#[must_use]
pub fn count_journeys(body: &Map<String, Value>) -> u64 {
    let count = status_entries(body)
        .filter(|e| e.journey.as_ref().is_some_and(|j| j.id.is_some()))
        .count();
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Finds the project id advertised in the journeys' tags. The last tag seen
/// wins.
#[must_use]
pub fn project_id_from_tags(body: &Map<String, Value>) -> Option<i64> {
    status_entries(body)
        .filter_map(|e| e.journey)
        .flat_map(|j| j.tags)
        .filter_map(|tag| tag.get("projectId").and_then(Value::as_i64))
        .last()
}

/// Splits journey titles by the outcome of their last execution.
///
/// `PASS` counts as passed; `FAIL` and `ERROR` count as failed. Any other
/// outcome, or a journey without a title, is left out.
#[must_use]
pub fn journey_outcomes(body: &Map<String, Value>) -> JourneyOutcomes {
    let mut outcomes = JourneyOutcomes::default();
    for entry in status_entries(body) {
        let Some(title) = entry.journey.and_then(|j| j.title) else {
            continue;
        };
        let outcome = entry
            .last_execution
            .and_then(|e| e.statistics)
            .and_then(|s| s.outcome)
            .unwrap_or_default();
        match outcome.as_str() {
            "PASS" => outcomes.passed.push(title),
            "FAIL" | "ERROR" => outcomes.failed.push(title),
            _ => {}
        }
    }
    outcomes
}
