//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod audit_service;
mod dashboard_service;
mod governance_ports;
mod governance_service;
mod project_service;
mod report_ports;
mod report_service;
mod resource_service;
mod task_service;
mod tracking_ports;
mod views;
mod workflow_hooks;
mod workflow_ports;

#[cfg(test)]
mod test_support;

pub use audit_ports::{AuditEntry, AuditEvent, AuditLogQuery, AuditRepository};
pub use audit_service::{AuditLogService, AuditTrail, AuditedWrite, MAX_AUDIT_PAGE_SIZE};
pub use dashboard_service::DashboardService;
pub use governance_ports::GovernanceRepository;
pub use governance_service::{
    GovernanceService, GovernanceSummary, ProjectHealth, ProjectReadiness, ProjectRisk,
    TEST_RUN_PAGE_SIZE,
};
pub use project_service::ProjectService;
pub use report_ports::{ReportJobPage, ReportJobQuery, ReportJobRepository};
pub use report_service::{
    MAX_REPORT_CLAIM, MAX_REPORT_PAGE_SIZE, REPORT_LEASE_SECONDS, ReportCallback,
    ReportDataSources, ReportDownload, ReportExecutionMode, ReportService,
};
pub use resource_service::ResourceService;
pub use task_service::TaskService;
pub use tracking_ports::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};
pub use views::{ProjectView, ResourceView, TaskMutation, TaskView};
pub use workflow_hooks::WorkflowHooks;
pub use workflow_ports::{WorkflowEvent, WorkflowEventKind, WorkflowNotifier};
