//! Report pipeline: walks the team configuration, queries the API and feeds
//! the matcher, aggregator and report builder.
//!
//! Failures for a single goal or planner are logged and absorbed here: the
//! goal contributes zero journeys, the planner contributes nothing, and names
//! fall back to `"Goal {id}"` / `"Planner {id}"`. Nothing in this module
//! aborts the run.

use std::collections::HashMap;

use chrono::FixedOffset;
use vqstats_api::{PlanJobs, VirtuosoClient};
use vqstats_core::{
    aggregate, match_paged, JobRecord, JourneyOutcomes, MatchPolicy, MatchWindow, PageLimits,
    ProjectConfig, Report, TeamConfig, TeamReportBuilder,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportOptions {
    pub policy: MatchPolicy,
    pub limits: PageLimits,
    pub tz: FixedOffset,
    pub journey_details: bool,
}

/// Goal names already resolved during this run.
#[derive(Debug, Default)]
struct GoalNames(HashMap<i64, String>);

impl GoalNames {
    async fn resolve(&mut self, client: &VirtuosoClient, goal_id: i64) -> String {
        if let Some(name) = self.0.get(&goal_id) {
            return name.clone();
        }
        let name = match client.goal_name(goal_id).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(goal_id, error = %e, "goal name lookup failed; using fallback");
                format!("Goal {goal_id}")
            }
        };
        self.0.insert(goal_id, name.clone());
        name
    }
}

/// Builds the summary and detail rows for every team, in file order.
pub(crate) async fn build_report(
    client: &VirtuosoClient,
    teams: &[TeamConfig],
    options: &ReportOptions,
) -> Report {
    let mut report = Report::default();
    let mut goal_names = GoalNames::default();

    for team in teams {
        tracing::info!(team = %team.team_name, projects = team.projects.len(), "processing team");
        let mut builder = TeamReportBuilder::new(&team.team_name);

        for project in &team.projects {
            builder.add_journeys(project_journeys(client, &team.team_name, project).await);

            for &planner_id in &project.planner_ids {
                add_planner(
                    client,
                    &mut builder,
                    &mut goal_names,
                    project.project_id,
                    planner_id,
                    options,
                )
                .await;
            }
        }

        report.push_team(builder);
    }

    report
}

/// Total journeys per team, in file order.
pub(crate) async fn journey_counts(
    client: &VirtuosoClient,
    teams: &[TeamConfig],
) -> Vec<(String, u64)> {
    let mut counts = Vec::with_capacity(teams.len());
    for team in teams {
        let mut total = 0;
        for project in &team.projects {
            total += project_journeys(client, &team.team_name, project).await;
        }
        counts.push((team.team_name.clone(), total));
    }
    counts
}

async fn project_journeys(client: &VirtuosoClient, team: &str, project: &ProjectConfig) -> u64 {
    let mut total = 0;
    for &goal_id in &project.goal_ids {
        match client.count_journeys(goal_id).await {
            Ok(count) => {
                tracing::debug!(team, goal_id, count, "journeys counted");
                total += count;
            }
            Err(e) => {
                tracing::warn!(
                    team,
                    goal_id,
                    unauthorized = e.is_unauthorized(),
                    error = %e,
                    "journey count failed; counting zero"
                );
            }
        }
    }
    total
}

async fn add_planner(
    client: &VirtuosoClient,
    builder: &mut TeamReportBuilder,
    goal_names: &mut GoalNames,
    project_id: i64,
    planner_id: i64,
    options: &ReportOptions,
) {
    let planner = match client.planner(planner_id).await {
        Ok(planner) => planner,
        Err(e) => {
            tracing::warn!(
                planner_id,
                unauthorized = e.is_unauthorized(),
                error = %e,
                "planner lookup failed; skipping planner"
            );
            return;
        }
    };
    let Some(scheduled) = planner.scheduled() else {
        tracing::warn!(planner_id, "planner has no next scheduled execution; skipping");
        return;
    };
    let planner_name = scheduled.display_name();

    let window = MatchWindow::for_schedule(scheduled.scheduled_time, options.policy, options.tz);
    tracing::debug!(
        planner_id,
        scheduled = %scheduled.scheduled_time,
        begin = %window.begin,
        end = %window.end,
        "matching jobs"
    );

    let source = PlanJobs::new(client, project_id, planner_id);
    let outcome = match_paged(&source, window, options.limits).await;
    if outcome.is_partial() {
        tracing::warn!(
            planner_id,
            pages = outcome.pages,
            stop = ?outcome.stop,
            "jobs pagination ended early; totals may be incomplete"
        );
    }

    let totals = aggregate(&outcome.selected);
    tracing::info!(
        planner = %planner_name,
        goals = totals.by_goal.len(),
        executed = totals.executed,
        passed = totals.passed,
        failed = totals.failed,
        "planner totals"
    );
    builder.add_plan(&totals);

    for (goal_id, goal) in &totals.by_goal {
        let goal_name = goal_names.resolve(client, *goal_id).await;
        let journeys = if options.journey_details {
            journey_titles(client, &outcome.selected[goal_id]).await
        } else {
            JourneyOutcomes::default()
        };
        builder.add_goal_detail(&planner_name, &goal_name, goal, journeys);
    }
}

async fn journey_titles(client: &VirtuosoClient, job: &JobRecord) -> JourneyOutcomes {
    let Some(snapshot_id) = job.snapshot_id.as_deref() else {
        tracing::debug!(job_id = %job.job_id, "job has no snapshot; no journey titles");
        return JourneyOutcomes::default();
    };
    match client.journey_outcomes(snapshot_id, job.goal_id).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            tracing::warn!(
                job_id = %job.job_id,
                goal_id = job.goal_id,
                error = %e,
                "journey title lookup failed"
            );
            JourneyOutcomes::default()
        }
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
