use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dto::common::optional_i64;

/// Incoming payload for project creation.
///
/// The display name is accepted as `name` or `project_name`.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-project-request.ts"
)]
pub struct CreateProjectRequest {
    #[serde(alias = "projectId", alias = "project_code")]
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub total_weight: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
}

/// Incoming payload for a partial project update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-project-request.ts"
)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub total_weight: Option<i64>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
}

/// API representation of a project with its task rollup.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub project_name: String,
    pub description: Option<String>,
    pub priority: String,
    pub total_weight: u8,
    pub status: String,
    pub start_date: Option<String>,
    pub target_date: Option<String>,
    pub total_tasks: u64,
    pub tasks_done: u64,
    pub completion_pct: f64,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}
