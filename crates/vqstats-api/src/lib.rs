//! Client for the test-automation platform's REST API.
//!
//! Covers the handful of endpoints the execution report needs: journey
//! status per goal, planner schedules, goal and project names, project jobs
//! and project executions. Responses are normalized into `vqstats-core`
//! types in [`normalize`].

pub mod client;
pub mod error;
pub mod jobs;
pub mod normalize;
pub mod types;

pub use client::{ExecutionSummary, GoalJourneys, PlannerInfo, VirtuosoClient};
pub use error::ApiError;
pub use jobs::PlanJobs;
