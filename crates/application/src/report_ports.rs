use async_trait::async_trait;
use gerbil_core::AppResult;
use gerbil_domain::{ReportJob, ReportStatus};
use uuid::Uuid;

/// Filters and paging for report job listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportJobQuery {
    /// Requesting user.
    pub user_email: Option<String>,
    /// Lifecycle status.
    pub status: Option<ReportStatus>,
    /// Page size.
    pub limit: usize,
    /// Rows to skip.
    pub offset: usize,
}

impl Default for ReportJobQuery {
    fn default() -> Self {
        Self {
            user_email: None,
            status: None,
            limit: 50,
            offset: 0,
        }
    }
}

impl ReportJobQuery {
    /// Returns whether a job satisfies the filters, ignoring paging.
    #[must_use]
    pub fn matches(&self, job: &ReportJob) -> bool {
        self.user_email
            .as_deref()
            .is_none_or(|email| job.user_email.as_deref() == Some(email))
            && self.status.is_none_or(|status| job.status == status)
    }
}

/// One page of report jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportJobPage {
    /// Jobs on this page, newest first.
    pub jobs: Vec<ReportJob>,
    /// Jobs matching the filters across all pages.
    pub total: u64,
}

/// Port for report job persistence and worker leasing.
#[async_trait]
pub trait ReportJobRepository: Send + Sync {
    /// Stores a new job.
    async fn insert_job(&self, job: &ReportJob) -> AppResult<()>;

    /// Overwrites an existing job.
    async fn update_job(&self, job: &ReportJob) -> AppResult<()>;

    /// Finds a job by id.
    async fn find_job(&self, job_id: Uuid) -> AppResult<Option<ReportJob>>;

    /// Lists jobs matching the query.
    async fn list_jobs(&self, query: &ReportJobQuery) -> AppResult<ReportJobPage>;

    /// Leases up to `limit` processing jobs that are unclaimed or whose lease expired, oldest first.
    async fn claim_jobs(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ReportJob>>;
}
