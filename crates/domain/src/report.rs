use std::str::FromStr;

use chrono::{DateTime, Utc};
use gerbil_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Report content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// One row per project with progress.
    ProjectStatus,
    /// One row per resource with allocation.
    ResourceUtilization,
    /// One row per task.
    TaskExport,
    /// One row per recorded test run.
    TestResults,
    /// Portfolio dashboard metrics.
    Dashboard,
}

impl ReportType {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectStatus => "project_status",
            Self::ResourceUtilization => "resource_utilization",
            Self::TaskExport => "task_export",
            Self::TestResults => "test_results",
            Self::Dashboard => "dashboard",
        }
    }
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "project_status" => Ok(Self::ProjectStatus),
            "resource_utilization" => Ok(Self::ResourceUtilization),
            "task_export" => Ok(Self::TaskExport),
            "test_results" => Ok(Self::TestResults),
            "dashboard" => Ok(Self::Dashboard),
            _ => Err(AppError::Validation(format!(
                "report_type must be one of project_status, resource_utilization, task_export, test_results, dashboard, got '{value}'"
            ))),
        }
    }
}

/// Report output encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// JSON document.
    #[default]
    Json,
    /// Comma-separated values.
    Csv,
    /// Excel workbook, rendered externally.
    Xlsx,
    /// PDF document, rendered externally.
    Pdf,
}

impl ReportFormat {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// MIME type of rendered content.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }

    /// Whether the service renders this format itself.
    #[must_use]
    pub fn is_rendered_in_process(&self) -> bool {
        matches!(self, Self::Json | Self::Csv)
    }
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "pdf" => Ok(Self::Pdf),
            _ => Err(AppError::Validation(format!(
                "format must be one of json, csv, xlsx, pdf, got '{value}'"
            ))),
        }
    }
}

/// Lifecycle of a report job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Accepted, not yet rendered.
    Processing,
    /// Content available.
    Completed,
    /// Rendering failed.
    Failed,
}

impl ReportStatus {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the job is finished either way.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "processing" | "pending" => Ok(Self::Processing),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            "failed" | "error" => Ok(Self::Failed),
            _ => Err(AppError::Validation(format!(
                "report status must be one of processing, completed, failed, got '{value}'"
            ))),
        }
    }
}

/// An asynchronous report request and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportJob {
    /// Job identifier.
    pub job_id: Uuid,
    /// Content kind.
    pub report_type: ReportType,
    /// Output encoding.
    pub format: ReportFormat,
    /// Lifecycle status.
    pub status: ReportStatus,
    /// Caller-supplied filters, a JSON object.
    pub filters: Value,
    /// Requesting user.
    pub user_email: Option<String>,
    /// Where the rendered file can be fetched.
    pub download_url: Option<String>,
    /// Suggested file name.
    pub filename: Option<String>,
    /// Rendered size in bytes.
    pub file_size: Option<u64>,
    /// Failure reason.
    pub error_message: Option<String>,
    /// Rendered content for in-process formats.
    pub content: Option<String>,
    /// Worker holding the job.
    pub claimed_by: Option<String>,
    /// Lease expiry for the claiming worker.
    pub lease_expires_at: Option<DateTime<Utc>>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Completion or failure time.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input payload for submitting a report job.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    /// Content kind.
    pub report_type: ReportType,
    /// Output encoding, defaults to json.
    pub format: Option<ReportFormat>,
    /// Filters, must be a JSON object when present.
    pub filters: Option<Value>,
    /// Requesting user.
    pub user_email: Option<String>,
}

impl ReportJob {
    /// Creates a job in the processing state.
    pub fn new(request: ReportRequest, now: DateTime<Utc>) -> AppResult<Self> {
        let filters = match request.filters {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(Value::Object(filters)) => Value::Object(filters),
            Some(_) => {
                return Err(AppError::Validation(
                    "filters must be a JSON object".to_owned(),
                ));
            }
        };

        Ok(Self {
            job_id: Uuid::new_v4(),
            report_type: request.report_type,
            format: request.format.unwrap_or_default(),
            status: ReportStatus::Processing,
            filters,
            user_email: request
                .user_email
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            download_url: None,
            filename: None,
            file_size: None,
            error_message: None,
            content: None,
            claimed_by: None,
            lease_expires_at: None,
            created_at: now,
            completed_at: None,
        })
    }

    /// Default file name for this job.
    #[must_use]
    pub fn default_filename(&self) -> String {
        format!(
            "{}_{}.{}",
            self.report_type.as_str(),
            self.created_at.format("%Y%m%d%H%M%S"),
            self.format.as_str()
        )
    }

    fn ensure_processing(&self) -> AppResult<()> {
        if self.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "report job '{}' is already {}",
                self.job_id,
                self.status.as_str()
            )));
        }

        Ok(())
    }

    /// Marks the job completed.
    pub fn complete(&mut self, outcome: ReportOutcome, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_processing()?;

        self.status = ReportStatus::Completed;
        self.file_size = outcome
            .file_size
            .or_else(|| outcome.content.as_ref().map(|content| content.len() as u64));
        self.filename = Some(outcome.filename.unwrap_or_else(|| self.default_filename()));
        self.content = outcome.content;
        self.download_url = outcome.download_url;
        self.error_message = None;
        self.claimed_by = None;
        self.lease_expires_at = None;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Marks the job failed.
    pub fn fail(&mut self, error_message: impl Into<String>, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_processing()?;

        self.status = ReportStatus::Failed;
        self.error_message = Some(error_message.into());
        self.claimed_by = None;
        self.lease_expires_at = None;
        self.completed_at = Some(now);
        Ok(())
    }
}

/// Rendering result applied to a job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    /// Rendered content, for in-process formats.
    pub content: Option<String>,
    /// Suggested file name.
    pub filename: Option<String>,
    /// Size in bytes when content lives elsewhere.
    pub file_size: Option<u64>,
    /// External download location.
    pub download_url: Option<String>,
}
