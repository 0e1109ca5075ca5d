//! Gerbil API composition root.

#![forbid(unsafe_code)]

use gerbil_api::{ApiConfig, build_app_state, build_router, connect_and_migrate, init_tracing};
use gerbil_core::AppError;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        let database_url = config.database_url.as_deref().ok_or_else(|| {
            AppError::Validation("DATABASE_URL is required to run migrations".to_owned())
        })?;
        connect_and_migrate(database_url).await?;
        info!("database migrations applied");
        return Ok(());
    }

    let app_state = build_app_state(&config).await?;
    let app = build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        storage = config.storage_backend.as_str(),
        report_mode = config.report_execution_mode.as_str(),
        "gerbil-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
