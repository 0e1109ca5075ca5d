use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dto::common::optional_i64;

/// Incoming payload for resource creation.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-resource-request.ts"
)]
pub struct CreateResourceRequest {
    #[serde(alias = "name")]
    pub resource_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub weekly_capacity_hrs: Option<i64>,
    pub is_active: Option<bool>,
}

/// Incoming payload for a partial resource update.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-resource-request.ts"
)]
pub struct UpdateResourceRequest {
    #[serde(alias = "name")]
    pub resource_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_i64")]
    #[ts(type = "number | string | null")]
    pub weekly_capacity_hrs: Option<i64>,
    pub is_active: Option<bool>,
}

/// API representation of a resource with its current workload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resource-response.ts"
)]
pub struct ResourceResponse {
    pub id: String,
    pub resource_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub weekly_capacity_hrs: u16,
    pub is_active: bool,
    pub current_allocation_hrs: f64,
    pub utilization_pct: f64,
    pub active_task_count: u64,
    pub is_overallocated: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}
