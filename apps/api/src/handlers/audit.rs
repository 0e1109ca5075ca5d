use axum::Json;
use axum::extract::State;
use gerbil_application::AuditLogQuery;

use crate::dto::{AuditEntryResponse, AuditLogQueryRequest};
use crate::error::ApiResult;
use crate::extract::ApiQuery;
use crate::state::AppState;

pub async fn list_audit_logs_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AuditLogQueryRequest>,
) -> ApiResult<Json<Vec<AuditEntryResponse>>> {
    let entries = state
        .audit_log_service
        .list_entries(AuditLogQuery::try_from(query)?)
        .await?
        .into_iter()
        .map(AuditEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
