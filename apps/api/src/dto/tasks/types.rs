use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dto::common::optional_f64;

/// Incoming payload for task creation.
///
/// `projectId`, `title` and `notes` are accepted as aliases of `project_id`,
/// `task_name` and `description`.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-task-request.ts"
)]
pub struct CreateTaskRequest {
    #[serde(alias = "task_code")]
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id_alias: Option<String>,
    pub task_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "resource1_id")]
    pub resource1_uuid: Option<String>,
    #[serde(alias = "resource2_id")]
    pub resource2_uuid: Option<String>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r1_estimate_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r1_actual_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r2_estimate_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r2_actual_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub estimate_days: Option<f64>,
    pub deadline: Option<String>,
    pub expected_start_date: Option<String>,
    pub actual_start_date: Option<String>,
    pub completed_date: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Incoming payload for a partial task update, including status transitions.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-task-request.ts"
)]
pub struct UpdateTaskRequest {
    #[serde(alias = "task_code")]
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(rename = "projectId")]
    pub project_id_alias: Option<String>,
    pub task_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "resource1_id")]
    pub resource1_uuid: Option<String>,
    #[serde(alias = "resource2_id")]
    pub resource2_uuid: Option<String>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r1_estimate_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r1_actual_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r2_estimate_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub r2_actual_hrs: Option<f64>,
    #[serde(default, deserialize_with = "optional_f64")]
    #[ts(type = "number | string | null")]
    pub estimate_days: Option<f64>,
    pub deadline: Option<String>,
    pub expected_start_date: Option<String>,
    pub actual_start_date: Option<String>,
    pub completed_date: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Task list filters.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    #[serde(alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(alias = "resourceId", alias = "resource_id")]
    pub assignee: Option<String>,
    pub status: Option<String>,
}

/// API representation of a task.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-response.ts"
)]
pub struct TaskResponse {
    pub id: String,
    pub task_id: String,
    pub project_id: String,
    pub task_name: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub resource1_uuid: Option<String>,
    pub resource2_uuid: Option<String>,
    pub r1_estimate_hrs: f64,
    pub r1_actual_hrs: f64,
    pub r2_estimate_hrs: f64,
    pub r2_actual_hrs: f64,
    pub total_estimate_hrs: f64,
    pub total_actual_hrs: f64,
    pub hours_variance: f64,
    pub estimate_days: Option<f64>,
    pub deadline: Option<String>,
    pub expected_start_date: Option<String>,
    pub actual_start_date: Option<String>,
    pub completed_date: Option<String>,
    pub tags: Vec<String>,
    pub is_overdue: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// Task after a write, with over-allocation warnings for its assignees.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-mutation-response.ts"
)]
pub struct TaskMutationResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    pub warnings: Vec<String>,
}
