use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use gerbil_application::TaskQuery;
use gerbil_domain::{TaskChanges, TaskInput};

use super::parse_path_id;
use crate::dto::{
    CreateTaskRequest, MessageEnvelope, TaskListQuery, TaskMutationResponse, TaskResponse,
    UpdateTaskRequest,
};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery, RequestActor};
use crate::state::AppState;

pub async fn list_tasks_handler(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .task_service
        .list_tasks(TaskQuery::try_from(query)?)
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();

    Ok(Json(tasks))
}

pub async fn create_task_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskMutationResponse>)> {
    let input = TaskInput::try_from(payload)?;
    let mutation = state.task_service.create_task(&actor, input).await?;

    Ok((StatusCode::CREATED, Json(TaskMutationResponse::from(mutation))))
}

pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = parse_path_id("task", &task_id)?;
    let task = state.task_service.get_task(task_id).await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn update_task_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(task_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskMutationResponse>> {
    let task_id = parse_path_id("task", &task_id)?;
    let changes = TaskChanges::try_from(payload)?;
    let mutation = state
        .task_service
        .update_task(&actor, task_id, changes)
        .await?;

    Ok(Json(TaskMutationResponse::from(mutation)))
}

pub async fn delete_task_handler(
    State(state): State<AppState>,
    RequestActor(actor): RequestActor,
    Path(task_id): Path<String>,
) -> ApiResult<Json<MessageEnvelope<TaskResponse>>> {
    let task_id = parse_path_id("task", &task_id)?;
    let task = state.task_service.delete_task(&actor, task_id).await?;

    Ok(Json(MessageEnvelope::new("Task deleted", TaskResponse::from(task))))
}
