use axum::Json;
use axum::extract::State;

use crate::dto::DashboardMetricsResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn dashboard_metrics_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardMetricsResponse>> {
    let metrics = state.dashboard_service.metrics().await?;
    Ok(Json(DashboardMetricsResponse::from(metrics)))
}
