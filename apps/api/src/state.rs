use std::time::Instant;

use gerbil_application::{
    AuditLogService, DashboardService, GovernanceService, ProjectService, ReportService,
    ResourceService, TaskService,
};

use crate::api_config::StorageBackend;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Project CRUD.
    pub project_service: ProjectService,
    /// Resource CRUD.
    pub resource_service: ResourceService,
    /// Task CRUD and status transitions.
    pub task_service: TaskService,
    /// Gates, approvals, readiness and risk.
    pub governance_service: GovernanceService,
    /// Portfolio rollups.
    pub dashboard_service: DashboardService,
    /// Report jobs.
    pub report_service: ReportService,
    /// Audit trail reads.
    pub audit_log_service: AuditLogService,
    /// Active storage adapter, reported by the health probe.
    pub storage_backend: StorageBackend,
    /// Bearer secret of the internal worker routes.
    pub worker_shared_secret: Option<String>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}
