use std::sync::Arc;
use std::time::Duration;

use gerbil_application::WorkflowNotifier;
use gerbil_core::AppError;
use gerbil_infrastructure::{HttpWorkflowNotifier, LoggingWorkflowNotifier};

use crate::api_config::ApiConfig;

const WEBHOOK_TIMEOUT_SECS: u64 = 10;
const WEBHOOK_MAX_ATTEMPTS: u8 = 3;
const WEBHOOK_RETRY_BACKOFF_MS: u64 = 250;

pub(super) fn build_workflow_notifier(
    config: &ApiConfig,
) -> Result<Arc<dyn WorkflowNotifier>, AppError> {
    let Some(webhook_url) = config.webhook_url.as_deref() else {
        return Ok(Arc::new(LoggingWorkflowNotifier));
    };

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build webhook client: {error}")))?;

    Ok(Arc::new(HttpWorkflowNotifier::new(
        http_client,
        webhook_url,
        WEBHOOK_MAX_ATTEMPTS,
        WEBHOOK_RETRY_BACKOFF_MS,
    )))
}
