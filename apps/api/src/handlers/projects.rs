use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use gerbil_domain::{ProjectChanges, ProjectInput};

use super::parse_path_id;
use crate::dto::{CreateProjectRequest, MessageEnvelope, ProjectResponse, UpdateProjectRequest};
use crate::error::ApiResult;
use crate::extract::{ApiJson, RequestActor};
use crate::state::AppState;

pub async fn list_projects_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .project_service
        .list_projects()
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let input = ProjectInput::try_from(payload)?;
    let project = state.project_service.create_project(&actor, input).await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id = parse_path_id("project", &project_id)?;
    let project = state.project_service.get_project(project_id).await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(project_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id = parse_path_id("project", &project_id)?;
    let changes = ProjectChanges::try_from(payload)?;
    let project = state
        .project_service
        .update_project(&actor, project_id, changes)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(project_id): Path<String>,
) -> ApiResult<Json<MessageEnvelope<ProjectResponse>>> {
    let project_id = parse_path_id("project", &project_id)?;
    let project = state
        .project_service
        .delete_project(&actor, project_id)
        .await?;

    Ok(Json(MessageEnvelope::new(
        "Project deleted",
        ProjectResponse::from(project),
    )))
}
