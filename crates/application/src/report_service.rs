use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use gerbil_core::{AppError, AppResult};
use gerbil_domain::{ReportJob, ReportOutcome, ReportRequest, ReportStatus};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dashboard_service::DashboardService;
use crate::governance_ports::GovernanceRepository;
use crate::report_ports::{ReportJobPage, ReportJobQuery, ReportJobRepository};
use crate::tracking_ports::{ProjectRepository, ResourceRepository, TaskRepository};
use crate::workflow_hooks::WorkflowHooks;
use crate::workflow_ports::WorkflowEventKind;

mod render;

#[cfg(test)]
mod tests;

use render::ReportSources;

/// Largest report page a caller can request.
pub const MAX_REPORT_PAGE_SIZE: usize = 100;
/// Largest batch a worker can claim at once.
pub const MAX_REPORT_CLAIM: usize = 25;
/// Lease granted to a worker per claimed job.
pub const REPORT_LEASE_SECONDS: u32 = 300;

/// Where report jobs are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportExecutionMode {
    /// Rendered by the API right after submission.
    #[default]
    Inline,
    /// Left for an out-of-process worker to claim.
    Queued,
}

impl ReportExecutionMode {
    /// Returns the stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Queued => "queued",
        }
    }
}

impl FromStr for ReportExecutionMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "queued" | "worker" => Ok(Self::Queued),
            _ => Err(AppError::Validation(format!(
                "report execution mode must be 'inline' or 'queued', got '{value}'"
            ))),
        }
    }
}

/// Completion notice sent by an external renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCallback {
    /// Job being reported on.
    pub job_id: Uuid,
    /// Final status, completed or failed.
    pub status: ReportStatus,
    /// Download location of the rendered file.
    pub download_url: Option<String>,
    /// Rendered file name.
    pub filename: Option<String>,
    /// Rendered file size in bytes.
    pub file_size: Option<u64>,
    /// Failure reason.
    pub error_message: Option<String>,
}

/// Rendered report ready to stream back to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDownload {
    /// Suggested file name.
    pub filename: String,
    /// MIME type.
    pub content_type: &'static str,
    /// Rendered content.
    pub content: String,
}

/// Repositories a report service reads from.
#[derive(Clone)]
pub struct ReportDataSources {
    /// Project repository.
    pub projects: Arc<dyn ProjectRepository>,
    /// Resource repository.
    pub resources: Arc<dyn ResourceRepository>,
    /// Task repository.
    pub tasks: Arc<dyn TaskRepository>,
    /// Governance repository.
    pub governance: Arc<dyn GovernanceRepository>,
}

/// Application service for asynchronous report jobs.
#[derive(Clone)]
pub struct ReportService {
    jobs: Arc<dyn ReportJobRepository>,
    sources: ReportSources,
    hooks: WorkflowHooks,
    mode: ReportExecutionMode,
    public_base_url: String,
}

impl ReportService {
    /// Creates a new report service.
    ///
    /// `public_base_url` prefixes download links; pass an empty string for relative links.
    #[must_use]
    pub fn new(
        jobs: Arc<dyn ReportJobRepository>,
        data: ReportDataSources,
        hooks: WorkflowHooks,
        mode: ReportExecutionMode,
        public_base_url: impl Into<String>,
    ) -> Self {
        let dashboard = DashboardService::new(
            data.projects.clone(),
            data.tasks.clone(),
            data.resources.clone(),
        );
        Self {
            jobs,
            sources: ReportSources {
                projects: data.projects,
                resources: data.resources,
                tasks: data.tasks,
                governance: data.governance,
                dashboard,
            },
            hooks,
            mode,
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Returns the configured execution mode.
    #[must_use]
    pub fn execution_mode(&self) -> ReportExecutionMode {
        self.mode
    }

    /// Accepts a report request and returns the job as submitted.
    ///
    /// In inline mode the job is rendered before this returns; the returned snapshot
    /// still shows it processing.
    pub async fn submit(&self, request: ReportRequest) -> AppResult<ReportJob> {
        let job = ReportJob::new(request, Utc::now())?;
        self.jobs.insert_job(&job).await?;

        info!(
            job_id = %job.job_id,
            report_type = job.report_type.as_str(),
            format = job.format.as_str(),
            mode = self.mode.as_str(),
            "report job submitted"
        );
        self.hooks
            .publish(
                WorkflowEventKind::ReportGenerate,
                json!({
                    "job_id": job.job_id,
                    "report_type": job.report_type.as_str(),
                    "format": job.format.as_str(),
                    "filters": job.filters,
                    "user_email": job.user_email,
                }),
            )
            .await;

        if self.mode == ReportExecutionMode::Inline {
            self.run_job(job.job_id).await?;
        }

        Ok(job)
    }

    /// Returns one job.
    pub async fn get_job(&self, job_id: Uuid) -> AppResult<ReportJob> {
        self.jobs
            .find_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("report job '{job_id}' does not exist")))
    }

    /// Lists jobs, newest first. The page size is clamped to 1..=100.
    pub async fn list_jobs(&self, mut query: ReportJobQuery) -> AppResult<ReportJobPage> {
        query.limit = query.limit.clamp(1, MAX_REPORT_PAGE_SIZE);
        self.jobs.list_jobs(&query).await
    }

    /// Returns the rendered content of a completed job.
    pub async fn download(&self, job_id: Uuid) -> AppResult<ReportDownload> {
        let job = self.get_job(job_id).await?;
        match job.status {
            ReportStatus::Processing => {
                return Err(AppError::Conflict(format!(
                    "report job '{job_id}' is still processing"
                )));
            }
            ReportStatus::Failed => {
                return Err(AppError::Conflict(format!(
                    "report job '{job_id}' failed: {}",
                    job.error_message.as_deref().unwrap_or("unknown error")
                )));
            }
            ReportStatus::Completed => {}
        }

        let filename = job
            .filename
            .clone()
            .unwrap_or_else(|| job.default_filename());
        let content = job.content.ok_or_else(|| {
            AppError::NotFound(format!(
                "report job '{job_id}' was rendered externally and has no stored content"
            ))
        })?;

        Ok(ReportDownload {
            filename,
            content_type: job.format.content_type(),
            content,
        })
    }

    /// Applies a completion notice from an external renderer.
    pub async fn apply_callback(&self, callback: ReportCallback) -> AppResult<ReportJob> {
        let mut job = self.get_job(callback.job_id).await?;
        let now = Utc::now();
        match callback.status {
            ReportStatus::Completed => job.complete(
                ReportOutcome {
                    content: None,
                    filename: callback.filename,
                    file_size: callback.file_size,
                    download_url: callback.download_url,
                },
                now,
            )?,
            ReportStatus::Failed => job.fail(
                callback
                    .error_message
                    .unwrap_or_else(|| "report generation failed".to_owned()),
                now,
            )?,
            ReportStatus::Processing => {
                return Err(AppError::Validation(
                    "callback status must be completed or failed".to_owned(),
                ));
            }
        }

        self.jobs.update_job(&job).await?;
        info!(job_id = %job.job_id, status = job.status.as_str(), "report callback applied");
        Ok(job)
    }

    /// Leases processing jobs to a worker.
    pub async fn claim_jobs(&self, worker_id: &str, limit: usize) -> AppResult<Vec<ReportJob>> {
        let worker_id = worker_id.trim();
        if worker_id.is_empty() {
            return Err(AppError::Validation("worker id is required".to_owned()));
        }

        let jobs = self
            .jobs
            .claim_jobs(
                worker_id,
                limit.clamp(1, MAX_REPORT_CLAIM),
                REPORT_LEASE_SECONDS,
            )
            .await?;
        if !jobs.is_empty() {
            info!(worker_id, claimed = jobs.len(), "report jobs claimed");
        }

        Ok(jobs)
    }

    /// Renders one job and stores the outcome. Terminal jobs are returned unchanged.
    pub async fn run_job(&self, job_id: Uuid) -> AppResult<ReportJob> {
        let mut job = self.get_job(job_id).await?;
        if job.status.is_terminal() {
            return Ok(job);
        }

        let rendered = match self.sources.table(&job).await {
            Ok(table) => render::encode(&job, &table),
            Err(error) => Err(error),
        };

        let now = Utc::now();
        match rendered {
            Ok(content) => {
                let download_url = format!(
                    "{}/api/reports/{}/download",
                    self.public_base_url, job.job_id
                );
                job.complete(
                    ReportOutcome {
                        content: Some(content),
                        filename: None,
                        file_size: None,
                        download_url: Some(download_url),
                    },
                    now,
                )?;
                info!(
                    job_id = %job.job_id,
                    file_size = job.file_size.unwrap_or_default(),
                    "report job completed"
                );
            }
            Err(error) => {
                job.fail(error.detail(), now)?;
                warn!(job_id = %job.job_id, error = %error, "report job failed");
            }
        }

        self.jobs.update_job(&job).await?;
        Ok(job)
    }
}
