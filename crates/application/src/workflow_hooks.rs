use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::workflow_ports::{WorkflowEvent, WorkflowEventKind, WorkflowNotifier};

/// Publishes automation events without letting delivery failures fail the write.
#[derive(Clone)]
pub struct WorkflowHooks {
    notifier: Arc<dyn WorkflowNotifier>,
}

impl WorkflowHooks {
    /// Creates hooks over a notifier.
    #[must_use]
    pub fn new(notifier: Arc<dyn WorkflowNotifier>) -> Self {
        Self { notifier }
    }

    /// Publishes one event, logging delivery errors.
    pub async fn publish(&self, kind: WorkflowEventKind, payload: Value) {
        if let Err(error) = self
            .notifier
            .notify(WorkflowEvent::new(kind, payload))
            .await
        {
            warn!(event = kind.as_str(), error = %error, "workflow hook delivery failed");
        }
    }
}
