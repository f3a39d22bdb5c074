//! One-off lookups: a planner's next run, a goal's journeys and the project
//! execution closest to a given time.

use anyhow::Context;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use vqstats_api::{ExecutionSummary, VirtuosoClient};

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// `(dd/mm/YYYY, hh:mm AM/PM)` in the reporting time zone.
fn format_next_run(at: DateTime<Utc>, tz: FixedOffset) -> (String, String) {
    let local = at.with_timezone(&tz);
    (
        local.format("%d/%m/%Y").to_string(),
        local.format("%I:%M %p").to_string(),
    )
}

/// Parses an RFC 3339 timestamp, or a naive date and time read in `tz`.
fn parse_local_datetime(input: &str, tz: FixedOffset) -> anyhow::Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .with_context(|| {
            format!("cannot parse '{input}'; expected e.g. \"2024-06-14 12:00\" or RFC 3339")
        })?;
    let local = tz
        .from_local_datetime(&naive)
        .single()
        .with_context(|| format!("'{input}' is not a valid local time"))?;
    Ok(local.with_timezone(&Utc))
}

pub(crate) async fn run_next_run(
    client: &VirtuosoClient,
    planner_id: i64,
    tz: FixedOffset,
) -> anyhow::Result<()> {
    let next = client
        .next_execution(planner_id)
        .await
        .with_context(|| format!("cannot read next execution of planner {planner_id}"))?;
    let (date, time) = format_next_run(next.scheduled_time, tz);
    println!("Planner: {}", next.display_name());
    println!("Next Execution Date: {date}");
    println!("Next Execution Time: {time}");
    Ok(())
}

pub(crate) async fn run_goal(client: &VirtuosoClient, goal_id: i64) -> anyhow::Result<()> {
    let journeys = client
        .goal_journeys(goal_id)
        .await
        .with_context(|| format!("cannot read journeys of goal {goal_id}"))?;
    println!("Goal ID: {goal_id}");
    println!("Journey Count: {}", journeys.count);

    let Some(project_id) = journeys.project_id else {
        println!("Project ID: not found in journey tags");
        return Ok(());
    };
    println!("Project ID: {project_id}");
    match client.project_name(project_id).await {
        Ok(name) => println!("Project Name: {name}"),
        Err(e) => {
            tracing::warn!(project_id, error = %e, "project name lookup failed");
            println!("Project Name: unavailable");
        }
    }
    Ok(())
}

fn closest_execution(
    executions: Vec<ExecutionSummary>,
    target: DateTime<Utc>,
    threshold_minutes: u32,
) -> Option<ExecutionSummary> {
    vqstats_core::closest_within(
        executions,
        target,
        Duration::minutes(i64::from(threshold_minutes)),
        |e| e.submit_time,
    )
}

pub(crate) async fn run_closest_execution(
    client: &VirtuosoClient,
    project_id: i64,
    at: &str,
    threshold_minutes: u32,
    tz: FixedOffset,
) -> anyhow::Result<()> {
    let target = parse_local_datetime(at, tz)?;
    let executions = client
        .project_executions(project_id)
        .await
        .with_context(|| format!("cannot list executions of project {project_id}"))?;
    tracing::debug!(project_id, executions = executions.len(), %target, "searching executions");

    match closest_execution(executions, target, threshold_minutes) {
        Some(found) => {
            println!("Execution ID: {}", found.id);
            if let Some(submitted) = found.submit_time {
                println!("Submitted: {}", submitted.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S"));
            }
            println!("Total Tests: {}", found.total_tests);
            println!("Total Passes: {}", found.total_passes);
        }
        None => println!(
            "No execution of project {project_id} within {threshold_minutes} minutes of {at}"
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn execution(id: &str, at: Option<DateTime<Utc>>) -> ExecutionSummary {
        ExecutionSummary {
            id: id.to_string(),
            submit_time: at,
            total_tests: 10,
            total_passes: 8,
        }
    }

    #[test]
    fn next_run_is_formatted_in_reporting_zone() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let (date, time) = format_next_run(utc(2024, 6, 15, 9, 0), ist);
        assert_eq!(date, "15/06/2024");
        assert_eq!(time, "02:30 PM");
    }

    #[test]
    fn naive_input_is_read_in_reporting_zone() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let at = parse_local_datetime("2024-06-14 12:00", ist).unwrap();
        assert_eq!(at, utc(2024, 6, 14, 6, 30));
    }

    #[test]
    fn rfc3339_input_keeps_its_own_offset() {
        let utc0 = FixedOffset::east_opt(0).unwrap();
        let at = parse_local_datetime("2024-06-14T12:00:00+02:00", utc0).unwrap();
        assert_eq!(at, utc(2024, 6, 14, 10, 0));
    }

    #[test]
    fn garbage_input_is_rejected() {
        let utc0 = FixedOffset::east_opt(0).unwrap();
        assert!(parse_local_datetime("yesterday", utc0).is_err());
    }

    #[test]
    fn closest_execution_respects_threshold() {
        let target = utc(2024, 6, 14, 12, 0);
        let executions = vec![
            execution("far", Some(utc(2024, 6, 14, 13, 0))),
            execution("undated", None),
            execution("near", Some(utc(2024, 6, 14, 11, 50))),
        ];
        let found = closest_execution(executions.clone(), target, 30).unwrap();
        assert_eq!(found.id, "near");

        assert!(closest_execution(executions, target, 5).is_none());
    }
}
