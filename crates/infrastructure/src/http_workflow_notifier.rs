use std::time::Duration;

use async_trait::async_trait;
use gerbil_application::{WorkflowEvent, WorkflowNotifier};
use gerbil_core::{AppError, AppResult};
use serde_json::json;
use tracing::{debug, info, warn};

/// Posts automation events to `{base_url}/{event}` in the background.
#[derive(Clone)]
pub struct HttpWorkflowNotifier {
    http_client: reqwest::Client,
    base_url: String,
    max_attempts: u8,
    retry_backoff_ms: u64,
}

impl HttpWorkflowNotifier {
    /// Creates a notifier for the hook base URL.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        max_attempts: u8,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            max_attempts: max_attempts.max(1),
            retry_backoff_ms: retry_backoff_ms.max(50),
        }
    }

    /// Returns the endpoint an event is posted to.
    #[must_use]
    pub fn event_url(&self, event: &WorkflowEvent) -> String {
        format!("{}/{}", self.base_url, event.kind.as_str())
    }

    /// Delivers one event, retrying transient failures.
    pub async fn deliver(&self, event: &WorkflowEvent) -> AppResult<()> {
        let url = self.event_url(event);
        let body = json!({
            "event": event.kind.as_str(),
            "payload": event.payload,
        });
        let mut attempt = 0_u8;
        let mut last_error: Option<String> = None;

        while attempt < self.max_attempts {
            attempt = attempt.saturating_add(1);
            let response = self
                .http_client
                .post(url.as_str())
                .header("X-Gerbil-Event", event.kind.as_str())
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    debug!(event = event.kind.as_str(), attempt, "workflow hook delivered");
                    return Ok(());
                }
                Ok(response)
                    if response.status().is_server_error()
                        || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS =>
                {
                    last_error = Some(format!(
                        "transient HTTP status {} for workflow hook '{url}'",
                        response.status()
                    ));
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
                    return Err(AppError::Validation(format!(
                        "workflow hook '{url}' rejected event with status {status}: {body}"
                    )));
                }
                Err(error) => {
                    last_error = Some(format!("workflow hook transport error: {error}"));
                }
            }

            if attempt < self.max_attempts {
                let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(AppError::Internal(last_error.unwrap_or_else(|| {
            "workflow hook delivery exhausted retries".to_owned()
        })))
    }
}

#[async_trait]
impl WorkflowNotifier for HttpWorkflowNotifier {
    async fn notify(&self, event: WorkflowEvent) -> AppResult<()> {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(error) = notifier.deliver(&event).await {
                warn!(event = event.kind.as_str(), error = %error, "workflow hook delivery failed");
            }
        });

        Ok(())
    }
}

/// Logs automation events when no hook URL is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingWorkflowNotifier;

#[async_trait]
impl WorkflowNotifier for LoggingWorkflowNotifier {
    async fn notify(&self, event: WorkflowEvent) -> AppResult<()> {
        info!(event = event.kind.as_str(), payload = %event.payload, "workflow event");
        Ok(())
    }
}
