use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::dto::common::optional_i64;

/// Incoming report request.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-report-request.ts"
)]
pub struct CreateReportRequest {
    #[serde(alias = "reportType", alias = "type")]
    pub report_type: Option<String>,
    pub format: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub filters: Option<Value>,
    #[serde(alias = "userEmail")]
    pub user_email: Option<String>,
}

/// API representation of a report job. Rendered content is served by the
/// download route only.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/report-job-response.ts"
)]
pub struct ReportJobResponse {
    pub job_id: String,
    pub report_type: String,
    pub format: String,
    pub status: String,
    #[ts(type = "Record<string, unknown>")]
    pub filters: Value,
    pub user_email: Option<String>,
    pub download_url: Option<String>,
    pub filename: Option<String>,
    pub file_size: Option<u64>,
    pub error_message: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Acknowledgement of an accepted report request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/submitted-report-response.ts"
)]
pub struct SubmittedReportResponse {
    pub job_id: String,
    pub status: String,
    pub report_type: String,
    pub format: String,
    pub status_url: String,
}

/// Job status envelope that also exposes `status` at the top level.
#[derive(Debug, Serialize)]
pub struct ReportStatusEnvelope {
    pub success: bool,
    pub status: String,
    pub data: ReportJobResponse,
}

/// Report job listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ReportListQuery {
    pub status: Option<String>,
    #[serde(alias = "userEmail")]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "optional_i64")]
    pub offset: Option<i64>,
}

/// Paging metadata of a report listing.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/pagination.ts"
)]
pub struct Pagination {
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// `{success, data, pagination}` envelope for report listings.
#[derive(Debug, Serialize)]
pub struct ReportListEnvelope {
    pub success: bool,
    pub data: Vec<ReportJobResponse>,
    pub pagination: Pagination,
}

/// Completion notice posted by an external renderer.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/report-callback-request.ts"
)]
pub struct ReportCallbackRequest {
    #[serde(alias = "jobId")]
    pub job_id: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "downloadUrl")]
    pub download_url: Option<String>,
    pub filename: Option<String>,
    #[serde(default, alias = "fileSize", deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub file_size: Option<i64>,
    #[serde(alias = "errorMessage", alias = "error")]
    pub error_message: Option<String>,
}

/// Worker claim request.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claim-report-jobs-request.ts"
)]
pub struct ClaimReportJobsRequest {
    pub limit: Option<usize>,
}

/// Jobs leased to the calling worker.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/claimed-report-jobs-response.ts"
)]
pub struct ClaimedReportJobsResponse {
    pub jobs: Vec<ReportJobResponse>,
}
