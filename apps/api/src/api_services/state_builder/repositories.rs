use std::sync::Arc;

use gerbil_application::{
    AuditRepository, GovernanceRepository, ProjectRepository, ReportJobRepository,
    ResourceRepository, TaskRepository,
};
use gerbil_infrastructure::{
    InMemoryAuditRepository, InMemoryGovernanceRepository, InMemoryReportJobRepository,
    InMemoryTrackingRepository, PostgresAuditRepository, PostgresGovernanceRepository,
    PostgresReportJobRepository, PostgresTrackingRepository,
};
use sqlx::PgPool;

pub(super) struct RepositorySet {
    pub projects: Arc<dyn ProjectRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub governance: Arc<dyn GovernanceRepository>,
    pub report_jobs: Arc<dyn ReportJobRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub(super) fn in_memory() -> Self {
        let tracking = Arc::new(InMemoryTrackingRepository::new());
        Self {
            projects: tracking.clone(),
            resources: tracking.clone(),
            tasks: tracking,
            governance: Arc::new(InMemoryGovernanceRepository::new()),
            report_jobs: Arc::new(InMemoryReportJobRepository::new()),
            audit: Arc::new(InMemoryAuditRepository::new()),
        }
    }

    pub(super) fn postgres(pool: PgPool) -> Self {
        let tracking = Arc::new(PostgresTrackingRepository::new(pool.clone()));
        Self {
            projects: tracking.clone(),
            resources: tracking.clone(),
            tasks: tracking,
            governance: Arc::new(PostgresGovernanceRepository::new(pool.clone())),
            report_jobs: Arc::new(PostgresReportJobRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool)),
        }
    }
}
