//! CSV output for the summary, detail and journey-count reports.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use vqstats_core::{DetailRow, TeamSummary};

const SUMMARY_HEADER: [&str; 5] = [
    "Team Name",
    "Journey Created",
    "TC Executed",
    "TC Passed",
    "TC Failed",
];

const DETAIL_HEADER: [&str; 8] = [
    "Team Name",
    "Planner Name",
    "Goal Name",
    "Total Executed",
    "Total Passed",
    "Total Failed",
    "Passed Journey Names",
    "Failed Journey Names",
];

const JOURNEY_COUNT_HEADER: [&str; 2] = ["Team Name", "Total Journey Count"];

pub(crate) fn write_summary<W: io::Write>(out: W, rows: &[TeamSummary]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(SUMMARY_HEADER)?;
    for row in rows {
        writer.write_record([
            row.team_name.clone(),
            row.journeys_created.to_string(),
            row.tc_executed.to_string(),
            row.tc_passed.to_string(),
            row.tc_failed.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_details<W: io::Write>(out: W, rows: &[DetailRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(DETAIL_HEADER)?;
    for row in rows {
        writer.write_record([
            row.team_name.clone(),
            row.planner_name.clone(),
            row.goal_name.clone(),
            row.executed.to_string(),
            row.passed.to_string(),
            row.failed.to_string(),
            row.passed_journeys.join(", "),
            row.failed_journeys.join(", "),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_journey_counts<W: io::Write>(
    out: W,
    rows: &[(String, u64)],
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(JOURNEY_COUNT_HEADER)?;
    for (team, count) in rows {
        writer.write_record([team.clone(), count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<std::fs::File> {
    std::fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))
}

pub(crate) fn write_summary_file(path: &Path, rows: &[TeamSummary]) -> anyhow::Result<()> {
    write_summary(create(path)?, rows)
        .with_context(|| format!("failed to write summary CSV {}", path.display()))
}

pub(crate) fn write_details_file(path: &Path, rows: &[DetailRow]) -> anyhow::Result<()> {
    write_details(create(path)?, rows)
        .with_context(|| format!("failed to write detail CSV {}", path.display()))
}

pub(crate) fn write_journey_counts_file(path: &Path, rows: &[(String, u64)]) -> anyhow::Result<()> {
    write_journey_counts(create(path)?, rows)
        .with_context(|| format!("failed to write journey counts CSV {}", path.display()))
}

/// `log_<YYYY-mm-dd_HH-MM-SS>.csv`, stamped in the reporting time zone.
pub(crate) fn default_detail_path(now: DateTime<Utc>, tz: FixedOffset) -> PathBuf {
    PathBuf::from(format!(
        "log_{}.csv",
        now.with_timezone(&tz).format("%Y-%m-%d_%H-%M-%S")
    ))
}
