use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use gerbil_domain::{ResourceChanges, ResourceInput};

use super::parse_path_id;
use crate::dto::{CreateResourceRequest, MessageEnvelope, ResourceResponse, UpdateResourceRequest};
use crate::error::ApiResult;
use crate::extract::{ApiJson, RequestActor};
use crate::state::AppState;

pub async fn list_resources_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ResourceResponse>>> {
    let resources = state
        .resource_service
        .list_resources()
        .await?
        .into_iter()
        .map(ResourceResponse::from)
        .collect();

    Ok(Json(resources))
}

pub async fn create_resource_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    ApiJson(payload): ApiJson<CreateResourceRequest>,
) -> ApiResult<(StatusCode, Json<ResourceResponse>)> {
    let resource = state
        .resource_service
        .create_resource(&actor, ResourceInput::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(ResourceResponse::from(resource))))
}

pub async fn get_resource_handler(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
) -> ApiResult<Json<ResourceResponse>> {
    let resource_id = parse_path_id("resource", &resource_id)?;
    let resource = state.resource_service.get_resource(resource_id).await?;

    Ok(Json(ResourceResponse::from(resource)))
}

pub async fn update_resource_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(resource_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateResourceRequest>,
) -> ApiResult<Json<ResourceResponse>> {
    let resource_id = parse_path_id("resource", &resource_id)?;
    let resource = state
        .resource_service
        .update_resource(&actor, resource_id, ResourceChanges::from(payload))
        .await?;

    Ok(Json(ResourceResponse::from(resource)))
}

pub async fn delete_resource_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(resource_id): Path<String>,
) -> ApiResult<Json<MessageEnvelope<ResourceResponse>>> {
    let resource_id = parse_path_id("resource", &resource_id)?;
    let resource = state
        .resource_service
        .delete_resource(&actor, resource_id)
        .await?;

    Ok(Json(MessageEnvelope::new(
        "Resource deleted",
        ResourceResponse::from(resource),
    )))
}
