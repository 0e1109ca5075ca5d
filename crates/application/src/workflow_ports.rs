use async_trait::async_trait;
use gerbil_core::AppResult;
use serde_json::Value;

/// Automation events published after successful writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowEventKind {
    /// A project was created.
    ProjectCreated,
    /// A project changed.
    ProjectUpdated,
    /// A project was soft-deleted.
    ProjectDeleted,
    /// A task was created.
    TaskCreated,
    /// A task changed.
    TaskUpdated,
    /// A task reached Done.
    TaskCompleted,
    /// A resource crossed its weekly capacity.
    ResourceOverallocated,
    /// A release decision was recorded.
    ApprovalRecorded,
    /// A report job needs an external renderer.
    ReportGenerate,
}

impl WorkflowEventKind {
    /// Returns the webhook path segment for the event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project-created",
            Self::ProjectUpdated => "project-updated",
            Self::ProjectDeleted => "project-deleted",
            Self::TaskCreated => "task-created",
            Self::TaskUpdated => "task-updated",
            Self::TaskCompleted => "task-completed",
            Self::ResourceOverallocated => "resource-overallocated",
            Self::ApprovalRecorded => "approval-recorded",
            Self::ReportGenerate => "report-generate",
        }
    }
}

/// Event payload delivered to the automation hook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowEvent {
    /// Event kind.
    pub kind: WorkflowEventKind,
    /// JSON payload.
    pub payload: Value,
}

impl WorkflowEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(kind: WorkflowEventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// Port for fire-and-forget automation hooks.
///
/// Implementations must not block the caller on delivery.
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    /// Publishes one event.
    async fn notify(&self, event: WorkflowEvent) -> AppResult<()>;
}
