use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use gerbil_application::{GovernanceSummary, ProjectHealth, ProjectReadiness, ProjectRisk};
use gerbil_core::AppError;
use gerbil_domain::{ApprovalInput, QualityGateInput, ReadinessStatus, TestRunInput};

use super::parse_path_id;
use crate::dto::{
    ApprovalResponse, DataEnvelope, EvaluateGateRequest, GateEvaluationResponse, ListEnvelope,
    QualityGateResponse, ReadinessQuery, RecordTestRunRequest, SaveQualityGateRequest,
    SubmitApprovalRequest, SubmitApprovalResponse, TestRunResponse,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, RequestActor};
use crate::state::AppState;

pub async fn save_quality_gate_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    ApiJson(payload): ApiJson<SaveQualityGateRequest>,
) -> ApiResult<Json<DataEnvelope<QualityGateResponse>>> {
    let input = QualityGateInput::try_from(payload)?;
    let gate = state
        .governance_service
        .save_quality_gate(&actor, input)
        .await?;

    Ok(Json(DataEnvelope::new(QualityGateResponse::from(gate))))
}

pub async fn quality_gate_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<QualityGateResponse>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let gate = state.governance_service.quality_gate(project_id).await?;

    Ok(Json(DataEnvelope::new(QualityGateResponse::from(gate))))
}

/// Evaluates a gate against the metrics in the body, or against the latest
/// test run when the body is empty.
pub async fn evaluate_quality_gate_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<DataEnvelope<GateEvaluationResponse>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        EvaluateGateRequest::default()
    } else {
        serde_json::from_slice::<EvaluateGateRequest>(&body).map_err(|error| {
            AppError::Validation(format!("invalid evaluation payload: {error}"))
        })?
    };

    let evaluation = state
        .governance_service
        .evaluate_gate(project_id, request.into_metrics()?)
        .await?;

    Ok(Json(DataEnvelope::new(GateEvaluationResponse::from(
        evaluation,
    ))))
}

pub async fn record_test_run_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    ApiJson(payload): ApiJson<RecordTestRunRequest>,
) -> ApiResult<(StatusCode, Json<DataEnvelope<TestRunResponse>>)> {
    let input = TestRunInput::try_from(payload)?;
    let run = state
        .governance_service
        .record_test_run(&actor, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataEnvelope::new(TestRunResponse::from(run))),
    ))
}

pub async fn list_test_runs_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ListEnvelope<TestRunResponse>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let runs = state
        .governance_service
        .list_test_runs(project_id)
        .await?
        .into_iter()
        .map(TestRunResponse::from)
        .collect();

    Ok(Json(ListEnvelope::new(runs)))
}

pub async fn submit_approval_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    ApiJson(payload): ApiJson<SubmitApprovalRequest>,
) -> ApiResult<Json<SubmitApprovalResponse>> {
    let input = ApprovalInput::try_from(payload)?;
    let approval = state
        .governance_service
        .submit_approval(&actor, input)
        .await?;

    Ok(Json(SubmitApprovalResponse::from(approval)))
}

pub async fn list_approvals_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ListEnvelope<ApprovalResponse>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let approvals = state
        .governance_service
        .list_approvals(project_id)
        .await?
        .into_iter()
        .map(ApprovalResponse::from)
        .collect();

    Ok(Json(ListEnvelope::new(approvals)))
}

/// Lists readiness verdicts as a bare array.
pub async fn release_readiness_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReadinessQuery>,
) -> ApiResult<Json<Vec<ProjectReadiness>>> {
    let status = query
        .status
        .filter(|status| !status.trim().is_empty())
        .map(|status| status.parse::<ReadinessStatus>())
        .transpose()?;
    let readiness = state.governance_service.release_readiness(status).await?;

    Ok(Json(readiness))
}

pub async fn project_readiness_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<ProjectReadiness>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let readiness = state
        .governance_service
        .project_readiness(project_id)
        .await?;

    Ok(Json(DataEnvelope::new(readiness)))
}

pub async fn quality_risks_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ListEnvelope<ProjectRisk>>> {
    let risks = state.governance_service.quality_risks().await?;
    Ok(Json(ListEnvelope::new(risks)))
}

pub async fn project_risk_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<ProjectRisk>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let risk = state.governance_service.project_risk(project_id).await?;

    Ok(Json(DataEnvelope::new(risk)))
}

pub async fn project_health_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ListEnvelope<ProjectHealth>>> {
    let health = state.governance_service.project_health().await?;
    Ok(Json(ListEnvelope::new(health)))
}

pub async fn project_health_for_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<DataEnvelope<ProjectHealth>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let health = state
        .governance_service
        .project_health_for(project_id)
        .await?;

    Ok(Json(DataEnvelope::new(health)))
}

pub async fn governance_summary_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<DataEnvelope<GovernanceSummary>>> {
    let summary = state.governance_service.dashboard_summary().await?;
    Ok(Json(DataEnvelope::new(summary)))
}
