use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_worker_internal_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/internal/worker/reports/claim",
            post(handlers::worker::claim_report_jobs_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_worker_auth,
        ))
}
