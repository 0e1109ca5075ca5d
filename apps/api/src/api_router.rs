use axum::Router;
use axum::routing::{get, post};
use gerbil_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;
mod worker_internal;

use cors::build_cors_layer;
use worker_internal::build_worker_internal_routes;

/// Builds the HTTP router. Public routes answer both unprefixed and under `/api`.
pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let public_routes = build_public_routes();

    Ok(Router::new()
        .merge(public_routes.clone())
        .nest("/api", public_routes)
        .merge(build_worker_internal_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}

fn build_public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/dashboard",
            get(handlers::dashboard::dashboard_metrics_handler),
        )
        .route(
            "/dashboard/metrics",
            get(handlers::dashboard::dashboard_metrics_handler),
        )
        .route(
            "/projects",
            get(handlers::projects::list_projects_handler)
                .post(handlers::projects::create_project_handler),
        )
        .route(
            "/projects/{project_id}",
            get(handlers::projects::get_project_handler)
                .patch(handlers::projects::update_project_handler)
                .put(handlers::projects::update_project_handler)
                .delete(handlers::projects::delete_project_handler),
        )
        .route(
            "/resources",
            get(handlers::resources::list_resources_handler)
                .post(handlers::resources::create_resource_handler),
        )
        .route(
            "/resources/{resource_id}",
            get(handlers::resources::get_resource_handler)
                .patch(handlers::resources::update_resource_handler)
                .put(handlers::resources::update_resource_handler)
                .delete(handlers::resources::delete_resource_handler),
        )
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks_handler).post(handlers::tasks::create_task_handler),
        )
        .route(
            "/tasks/{task_id}",
            get(handlers::tasks::get_task_handler)
                .patch(handlers::tasks::update_task_handler)
                .put(handlers::tasks::update_task_handler)
                .delete(handlers::tasks::delete_task_handler),
        )
        .route(
            "/governance/gates",
            post(handlers::governance::save_quality_gate_handler),
        )
        .route(
            "/governance/gates/{project_id}",
            get(handlers::governance::quality_gate_handler),
        )
        .route(
            "/governance/gates/{project_id}/evaluate",
            post(handlers::governance::evaluate_quality_gate_handler),
        )
        .route(
            "/governance/test-runs",
            post(handlers::governance::record_test_run_handler),
        )
        .route(
            "/governance/test-runs/{project_id}",
            get(handlers::governance::list_test_runs_handler),
        )
        .route(
            "/governance/approvals",
            post(handlers::governance::submit_approval_handler),
        )
        .route(
            "/governance/approvals/{project_id}",
            get(handlers::governance::list_approvals_handler),
        )
        .route(
            "/governance/release-readiness",
            get(handlers::governance::release_readiness_handler),
        )
        .route(
            "/governance/release-readiness/{project_id}",
            get(handlers::governance::project_readiness_handler),
        )
        .route(
            "/governance/quality-risks",
            get(handlers::governance::quality_risks_handler),
        )
        .route(
            "/governance/quality-risks/{project_id}",
            get(handlers::governance::project_risk_handler),
        )
        .route(
            "/governance/project-health",
            get(handlers::governance::project_health_handler),
        )
        .route(
            "/governance/project-health/{project_id}",
            get(handlers::governance::project_health_for_handler),
        )
        .route(
            "/governance/dashboard-summary",
            get(handlers::governance::governance_summary_handler),
        )
        .route(
            "/reports",
            get(handlers::reports::list_reports_handler)
                .post(handlers::reports::submit_report_handler),
        )
        .route(
            "/reports/callback",
            post(handlers::reports::report_callback_handler),
        )
        .route(
            "/reports/{job_id}",
            get(handlers::reports::report_status_handler),
        )
        .route(
            "/reports/{job_id}/download",
            get(handlers::reports::download_report_handler),
        )
        .route(
            "/audit-logs",
            get(handlers::audit::list_audit_logs_handler),
        )
        .route(
            "/audit/logs",
            get(handlers::audit::list_audit_logs_handler),
        )
}

#[cfg(test)]
mod tests;
