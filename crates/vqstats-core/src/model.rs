//! Normalized records shared between the API client and the report pipeline.

use chrono::{DateTime, Utc};

/// One job (a concrete execution of a plan for a single goal).
///
/// Counters are signed so that inconsistent upstream data (more passes than
/// executions) survives aggregation unchanged instead of being clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub job_id: String,
    pub goal_id: i64,
    pub plan_id: Option<i64>,
    pub submit_time: DateTime<Utc>,
    pub executed_count: i64,
    pub passed_count: i64,
    /// Snapshot of the goal's journeys at the time the job ran.
    pub snapshot_id: Option<String>,
}

impl JobRecord {
    /// `executed − passed`, computed rather than fetched.
    #[must_use]
    pub fn failed_count(&self) -> i64 {
        self.executed_count - self.passed_count
    }
}

/// A planner's next scheduled run, as reported by the planner endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledExecution {
    pub plan_id: i64,
    pub plan_name: Option<String>,
    pub scheduled_time: DateTime<Utc>,
}

impl ScheduledExecution {
    #[must_use]
    pub fn display_name(&self) -> String {
        self.plan_name
            .clone()
            .unwrap_or_else(|| format!("Planner {}", self.plan_id))
    }
}

/// Journey titles grouped by the outcome of their last execution in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JourneyOutcomes {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}
