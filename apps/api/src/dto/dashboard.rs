use gerbil_domain::DashboardMetrics;
use serde::Serialize;
use ts_rs::TS;

use super::common::format_timestamp;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub storage: &'static str,
}

/// Portfolio rollup across live projects, tasks and resources.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/dashboard-metrics-response.ts"
)]
pub struct DashboardMetricsResponse {
    pub total_tasks: u64,
    pub tasks_done: u64,
    pub tasks_in_progress: u64,
    pub tasks_backlog: u64,
    pub tasks_cancelled: u64,
    pub overall_completion_rate_pct: f64,
    pub total_estimated_hrs: f64,
    pub total_actual_hrs: f64,
    pub total_hours_variance: f64,
    pub total_projects: u64,
    pub projects_with_tasks: u64,
    pub active_resources: u64,
    pub overallocated_resources: u64,
    pub calculated_at: String,
}

impl From<DashboardMetrics> for DashboardMetricsResponse {
    fn from(value: DashboardMetrics) -> Self {
        Self {
            total_tasks: value.total_tasks,
            tasks_done: value.tasks_done,
            tasks_in_progress: value.tasks_in_progress,
            tasks_backlog: value.tasks_backlog,
            tasks_cancelled: value.tasks_cancelled,
            overall_completion_rate_pct: value.overall_completion_rate_pct,
            total_estimated_hrs: value.total_estimated_hrs,
            total_actual_hrs: value.total_actual_hrs,
            total_hours_variance: value.total_hours_variance,
            total_projects: value.total_projects,
            projects_with_tasks: value.projects_with_tasks,
            active_resources: value.active_resources,
            overallocated_resources: value.overallocated_resources,
            calculated_at: format_timestamp(value.calculated_at),
        }
    }
}
