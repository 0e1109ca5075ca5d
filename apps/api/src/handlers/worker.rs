use axum::Json;
use axum::extract::{Extension, State};
use gerbil_application::MAX_REPORT_CLAIM;

use crate::dto::{ClaimReportJobsRequest, ClaimedReportJobsResponse, ReportJobResponse};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::WorkerIdentity;
use crate::state::AppState;

pub async fn claim_report_jobs_handler(
    State(state): State<AppState>,
    Extension(worker): Extension<WorkerIdentity>,
    ApiJson(payload): ApiJson<ClaimReportJobsRequest>,
) -> ApiResult<Json<ClaimedReportJobsResponse>> {
    let limit = payload.limit.unwrap_or(MAX_REPORT_CLAIM);
    let jobs = state
        .report_service
        .claim_jobs(worker.worker_id(), limit)
        .await?
        .into_iter()
        .map(ReportJobResponse::from)
        .collect();

    Ok(Json(ClaimedReportJobsResponse { jobs }))
}
