mod email;
mod export;
mod inspect;
mod report;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vqstats_api::VirtuosoClient;
use vqstats_core::{AppConfig, DayAnchor, MatchPolicy, PageLimits};

#[derive(Debug, Parser)]
#[command(name = "vqstats")]
#[command(about = "Execution statistics report for test-automation teams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Jobs submitted on the calendar day before the scheduled run
    PreviousDay,
    /// Jobs submitted within `--window-minutes` of the scheduled run
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnchorArg {
    /// Closest to 12:00 of the previous day
    Midday,
    /// Closest to exactly 24 hours before the scheduled run
    ScheduledTime,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the summary and detail execution reports
    Report {
        /// Team configuration file (JSON)
        teams: PathBuf,
        /// Summary CSV output path
        #[arg(long, default_value = "summary.csv")]
        summary_out: PathBuf,
        /// Detail CSV output path (defaults to log_<timestamp>.csv)
        #[arg(long)]
        detail_out: Option<PathBuf>,
        /// How jobs are matched to a planner's scheduled run
        #[arg(long, value_enum, default_value_t = PolicyArg::PreviousDay)]
        policy: PolicyArg,
        /// Distance anchor for the previous-day policy
        #[arg(long, value_enum, default_value_t = AnchorArg::Midday)]
        anchor: AnchorArg,
        /// Half-width of the window policy, in minutes
        #[arg(long, default_value_t = 2)]
        window_minutes: u32,
        /// Look up passed and failed journey titles for each matched job
        #[arg(long)]
        journey_details: bool,
        /// Email the summary CSV once written
        #[arg(long)]
        email: bool,
    },
    /// Write the total journey count per team
    Journeys {
        /// Team configuration file (JSON)
        teams: PathBuf,
        #[arg(long, default_value = "journey_counts.csv")]
        out: PathBuf,
    },
    /// Print a planner's next scheduled run
    NextRun { planner_id: i64 },
    /// Print a goal's journey count and owning project
    Goal { goal_id: i64 },
    /// Find the project execution closest to a local date and time
    ClosestExecution {
        project_id: i64,
        /// Target in the reporting time zone, e.g. "2024-06-14 12:00"
        #[arg(long)]
        at: String,
        #[arg(long, default_value_t = 30)]
        threshold_minutes: u32,
    },
}

fn match_policy(policy: PolicyArg, anchor: AnchorArg, window_minutes: u32) -> MatchPolicy {
    match policy {
        PolicyArg::PreviousDay => MatchPolicy::PreviousDay {
            anchor: match anchor {
                AnchorArg::Midday => DayAnchor::Midday,
                AnchorArg::ScheduledTime => DayAnchor::ScheduledTime,
            },
        },
        PolicyArg::Window => MatchPolicy::Window {
            half_width: chrono::Duration::minutes(i64::from(window_minutes)),
        },
    }
}

fn build_client(config: &AppConfig) -> anyhow::Result<VirtuosoClient> {
    VirtuosoClient::with_base_url(
        &config.api_base_url,
        &config.api_token,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build API client")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = vqstats_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = build_client(&config)?;

    match cli.command {
        Commands::Report {
            teams,
            summary_out,
            detail_out,
            policy,
            anchor,
            window_minutes,
            journey_details,
            email,
        } => {
            let teams = vqstats_core::load_teams(&teams)?;
            let options = report::ReportOptions {
                policy: match_policy(policy, anchor, window_minutes),
                limits: PageLimits {
                    page_size: config.page_size,
                    max_pages: config.max_pages,
                },
                tz: config.tz_offset,
                journey_details,
            };
            let smtp = if email {
                Some(config.smtp.as_ref().context(
                    "--email requires VQSTATS_SMTP_HOST and the other SMTP settings",
                )?)
            } else {
                None
            };

            let report = report::build_report(&client, &teams, &options).await;

            export::write_summary_file(&summary_out, &report.summaries)?;
            let detail_out = detail_out.unwrap_or_else(|| {
                export::default_detail_path(chrono::Utc::now(), config.tz_offset)
            });
            export::write_details_file(&detail_out, &report.details)?;
            tracing::info!(
                teams = report.summaries.len(),
                detail_rows = report.details.len(),
                summary = %summary_out.display(),
                detail = %detail_out.display(),
                "report written"
            );

            if let Some(smtp) = smtp {
                email::send_summary(smtp, &summary_out).await?;
            }
        }
        Commands::Journeys { teams, out } => {
            let teams = vqstats_core::load_teams(&teams)?;
            let counts = report::journey_counts(&client, &teams).await;
            export::write_journey_counts_file(&out, &counts)?;
            tracing::info!(teams = counts.len(), out = %out.display(), "journey counts written");
        }
        Commands::NextRun { planner_id } => {
            inspect::run_next_run(&client, planner_id, config.tz_offset).await?;
        }
        Commands::Goal { goal_id } => {
            inspect::run_goal(&client, goal_id).await?;
        }
        Commands::ClosestExecution {
            project_id,
            at,
            threshold_minutes,
        } => {
            inspect::run_closest_execution(
                &client,
                project_id,
                &at,
                threshold_minutes,
                config.tz_offset,
            )
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
