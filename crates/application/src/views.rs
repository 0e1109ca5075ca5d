use gerbil_domain::{Project, ProjectProgress, Resource, ResourceAllocation, Task};

/// Project with its task rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectView {
    /// Stored project.
    pub project: Project,
    /// Derived progress.
    pub progress: ProjectProgress,
}

/// Resource with its derived workload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceView {
    /// Stored resource.
    pub resource: Resource,
    /// Derived allocation.
    pub allocation: ResourceAllocation,
}

/// Task with date-dependent flags.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    /// Stored task.
    pub task: Task,
    /// Whether the task is open and past its deadline.
    pub is_overdue: bool,
}

/// Result of a task write, with capacity warnings for its assignees.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMutation {
    /// Task after the write.
    pub view: TaskView,
    /// Over-allocation warnings, one per affected resource.
    pub warnings: Vec<String>,
}
