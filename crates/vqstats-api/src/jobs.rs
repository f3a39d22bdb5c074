//! Jobs endpoint as a [`JobPageSource`] for one project / planner pair.

use vqstats_core::{JobPage, JobPageSource, MatchWindow};

use crate::client::VirtuosoClient;
use crate::error::ApiError;

/// Pages of `GET /projects/{project_id}/jobs` filtered to one planner.
pub struct PlanJobs<'a> {
    pub client: &'a VirtuosoClient,
    pub project_id: i64,
    pub plan_id: i64,
}

impl<'a> PlanJobs<'a> {
    #[must_use]
    pub fn new(client: &'a VirtuosoClient, project_id: i64, plan_id: i64) -> Self {
        Self {
            client,
            project_id,
            plan_id,
        }
    }
}

impl JobPageSource for PlanJobs<'_> {
    type Error = ApiError;

    fn plan_id(&self) -> Option<i64> {
        Some(self.plan_id)
    }

    async fn fetch_page(
        &self,
        window: &MatchWindow,
        last_id: Option<&str>,
    ) -> Result<JobPage, ApiError> {
        self.client
            .jobs_page(self.project_id, self.plan_id, window, last_id)
            .await
    }
}
