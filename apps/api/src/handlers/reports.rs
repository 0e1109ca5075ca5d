use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use gerbil_application::{MAX_REPORT_PAGE_SIZE, ReportCallback, ReportJobQuery};
use gerbil_domain::ReportRequest;

use super::parse_path_id;
use crate::dto::{
    CreateReportRequest, MessageEnvelope, ReportCallbackRequest, ReportJobResponse,
    ReportListEnvelope, ReportListQuery, ReportStatusEnvelope, SubmittedReportResponse,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub async fn submit_report_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<MessageEnvelope<SubmittedReportResponse>>)> {
    let request = ReportRequest::try_from(payload)?;
    let job = state.report_service.submit(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageEnvelope::new(
            "Report generation started",
            SubmittedReportResponse::from(&job),
        )),
    ))
}

pub async fn list_reports_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReportListQuery>,
) -> ApiResult<Json<ReportListEnvelope>> {
    let query = ReportJobQuery::try_from(query)?;
    let (limit, offset) = (query.limit.clamp(1, MAX_REPORT_PAGE_SIZE), query.offset);
    let page = state.report_service.list_jobs(query).await?;

    Ok(Json(ReportListEnvelope::from_page(page, limit, offset)))
}

pub async fn report_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ReportStatusEnvelope>> {
    let job_id = parse_path_id("report job", &job_id)?;
    let job = state.report_service.get_job(job_id).await?;

    Ok(Json(ReportStatusEnvelope::from(job)))
}

/// Serves rendered content with the format's content type.
pub async fn download_report_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let job_id = parse_path_id("report job", &job_id)?;
    let download = state.report_service.download(job_id).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        download.filename.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.content,
    )
        .into_response())
}

pub async fn report_callback_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ReportCallbackRequest>,
) -> ApiResult<Json<MessageEnvelope<ReportJobResponse>>> {
    let callback = ReportCallback::try_from(payload)?;
    let job = state.report_service.apply_callback(callback).await?;

    Ok(Json(MessageEnvelope::new(
        "Report status updated",
        ReportJobResponse::from(job),
    )))
}
