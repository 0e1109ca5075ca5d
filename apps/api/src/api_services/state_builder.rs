use std::time::Instant;

use gerbil_application::{
    AuditLogService, AuditTrail, DashboardService, GovernanceService, ProjectService,
    ReportDataSources, ReportService, ResourceService, TaskService, WorkflowHooks,
};
use gerbil_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackend};
use crate::state::AppState;

use super::database::connect_and_migrate;

mod notifier;
mod repositories;

use repositories::RepositorySet;

/// Builds the application state over the configured storage backend.
pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let repositories = match config.storage_backend {
        StorageBackend::Memory => RepositorySet::in_memory(),
        StorageBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Validation("DATABASE_URL is required for postgres storage".to_owned())
            })?;
            RepositorySet::postgres(connect_and_migrate(database_url).await?)
        }
    };

    assemble(repositories, config, config.storage_backend)
}

/// Builds the application state over fresh in-memory storage.
pub fn build_memory_state(config: &ApiConfig) -> Result<AppState, AppError> {
    assemble(RepositorySet::in_memory(), config, StorageBackend::Memory)
}

fn assemble(
    repositories: RepositorySet,
    config: &ApiConfig,
    storage_backend: StorageBackend,
) -> Result<AppState, AppError> {
    let hooks = WorkflowHooks::new(notifier::build_workflow_notifier(config)?);
    let audit = AuditTrail::new(repositories.audit.clone());

    info!(
        storage = storage_backend.as_str(),
        report_mode = config.report_execution_mode.as_str(),
        webhooks = config.webhook_url.is_some(),
        "application state assembled"
    );

    Ok(AppState {
        project_service: ProjectService::new(
            repositories.projects.clone(),
            repositories.tasks.clone(),
            audit.clone(),
            hooks.clone(),
        ),
        resource_service: ResourceService::new(
            repositories.resources.clone(),
            repositories.tasks.clone(),
            audit.clone(),
        ),
        task_service: TaskService::new(
            repositories.tasks.clone(),
            repositories.projects.clone(),
            repositories.resources.clone(),
            audit.clone(),
            hooks.clone(),
        ),
        governance_service: GovernanceService::new(
            repositories.governance.clone(),
            repositories.projects.clone(),
            repositories.tasks.clone(),
            audit,
            hooks.clone(),
        ),
        dashboard_service: DashboardService::new(
            repositories.projects.clone(),
            repositories.tasks.clone(),
            repositories.resources.clone(),
        ),
        report_service: ReportService::new(
            repositories.report_jobs,
            ReportDataSources {
                projects: repositories.projects,
                resources: repositories.resources,
                tasks: repositories.tasks,
                governance: repositories.governance,
            },
            hooks,
            config.report_execution_mode,
            config.public_base_url.as_str(),
        ),
        audit_log_service: AuditLogService::new(repositories.audit),
        storage_backend,
        worker_shared_secret: config.worker_shared_secret.clone(),
        started_at: Instant::now(),
    })
}
