//! Domain model and reconciliation logic for execution reports.
//!
//! Everything in this crate is transport-free: the HTTP client lives in
//! `vqstats-api` and feeds pages of [`JobRecord`]s into the matcher through
//! the [`JobPageSource`] trait.

pub mod aggregate;
pub mod app_config;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod report;
pub mod teams;

pub use aggregate::{aggregate, GoalTotals, PlanTotals};
pub use app_config::{AppConfig, SmtpConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use matcher::{
    closest_within, match_paged, DayAnchor, ExecutionMatcher, JobPage, JobPageSource,
    MatchOutcome, MatchPolicy, MatchWindow, PageLimits, StopReason,
};
pub use model::{JobRecord, JourneyOutcomes, ScheduledExecution};
pub use report::{DetailRow, Report, TeamReportBuilder, TeamSummary};
pub use teams::{load_teams, parse_teams, ProjectConfig, TeamConfig};
