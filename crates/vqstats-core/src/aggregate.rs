//! Folds matched jobs into per-goal and per-plan totals.

use std::collections::BTreeMap;

use crate::model::JobRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalTotals {
    pub goal_id: i64,
    pub executed: i64,
    pub passed: i64,
    pub failed: i64,
}

impl GoalTotals {
    #[must_use]
    pub fn from_record(record: &JobRecord) -> Self {
        Self {
            goal_id: record.goal_id,
            executed: record.executed_count,
            passed: record.passed_count,
            failed: record.failed_count(),
        }
    }
}

/// Totals for one planner run, with the per-goal breakdown retained for the
/// detail report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanTotals {
    pub executed: i64,
    pub passed: i64,
    pub failed: i64,
    pub by_goal: BTreeMap<i64, GoalTotals>,
}

impl PlanTotals {
    fn add(&mut self, goal: GoalTotals) {
        self.executed += goal.executed;
        self.passed += goal.passed;
        self.failed += goal.failed;
        self.by_goal.insert(goal.goal_id, goal);
    }
}

/// Sums the selected job of every goal.
///
/// Inconsistent records (`passed > executed`) are kept as-is, so `failed`
/// can go negative; each one is logged as a data-quality warning.
#[must_use]
pub fn aggregate(selected: &BTreeMap<i64, JobRecord>) -> PlanTotals {
    let mut totals = PlanTotals::default();
    for record in selected.values() {
        let goal = GoalTotals::from_record(record);
        if goal.failed < 0 || goal.executed < 0 || goal.passed < 0 {
            tracing::warn!(
                job_id = %record.job_id,
                goal_id = record.goal_id,
                executed = goal.executed,
                passed = goal.passed,
                "job reports inconsistent execution counts"
            );
        }
        totals.add(goal);
    }
    totals
}
