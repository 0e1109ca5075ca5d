//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_workflow_notifier;
mod in_memory_audit_repository;
mod in_memory_governance_repository;
mod in_memory_report_job_repository;
mod in_memory_tracking_repository;
mod postgres_audit_repository;
mod postgres_governance_repository;
mod postgres_report_job_repository;
mod postgres_tracking_repository;

pub use http_workflow_notifier::{HttpWorkflowNotifier, LoggingWorkflowNotifier};
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_governance_repository::InMemoryGovernanceRepository;
pub use in_memory_report_job_repository::InMemoryReportJobRepository;
pub use in_memory_tracking_repository::InMemoryTrackingRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_governance_repository::PostgresGovernanceRepository;
pub use postgres_report_job_repository::PostgresReportJobRepository;
pub use postgres_tracking_repository::PostgresTrackingRepository;
