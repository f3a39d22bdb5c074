//! Summary and detail rows built from aggregated planner totals.
//!
//! A [`TeamReportBuilder`] owns the running totals for one team; the team
//! configuration it was started from is never touched.

use crate::aggregate::{GoalTotals, PlanTotals};
use crate::model::JourneyOutcomes;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSummary {
    pub team_name: String,
    pub journeys_created: u64,
    pub tc_executed: i64,
    pub tc_passed: i64,
    pub tc_failed: i64,
}

/// One row per team / planner / goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRow {
    pub team_name: String,
    pub planner_name: String,
    pub goal_name: String,
    pub executed: i64,
    pub passed: i64,
    pub failed: i64,
    pub passed_journeys: Vec<String>,
    pub failed_journeys: Vec<String>,
}

#[derive(Debug)]
pub struct TeamReportBuilder {
    summary: TeamSummary,
    details: Vec<DetailRow>,
}

impl TeamReportBuilder {
    #[must_use]
    pub fn new(team_name: &str) -> Self {
        Self {
            summary: TeamSummary {
                team_name: team_name.to_owned(),
                ..TeamSummary::default()
            },
            details: Vec::new(),
        }
    }

    pub fn add_journeys(&mut self, count: u64) {
        self.summary.journeys_created += count;
    }

    /// Adds a planner's totals to the team summary.
    pub fn add_plan(&mut self, totals: &PlanTotals) {
        self.summary.tc_executed += totals.executed;
        self.summary.tc_passed += totals.passed;
        self.summary.tc_failed += totals.failed;
    }

    /// Records the detail row for one goal of a planner run.
    pub fn add_goal_detail(
        &mut self,
        planner_name: &str,
        goal_name: &str,
        goal: &GoalTotals,
        journeys: JourneyOutcomes,
    ) {
        self.details.push(DetailRow {
            team_name: self.summary.team_name.clone(),
            planner_name: planner_name.to_owned(),
            goal_name: goal_name.to_owned(),
            executed: goal.executed,
            passed: goal.passed,
            failed: goal.failed,
            passed_journeys: journeys.passed,
            failed_journeys: journeys.failed,
        });
    }

    #[must_use]
    pub fn finish(self) -> (TeamSummary, Vec<DetailRow>) {
        (self.summary, self.details)
    }
}

/// The full output of a report run, in team-file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub summaries: Vec<TeamSummary>,
    pub details: Vec<DetailRow>,
}

impl Report {
    pub fn push_team(&mut self, team: TeamReportBuilder) {
        let (summary, details) = team.finish();
        self.summaries.push(summary);
        self.details.extend(details);
    }
}
