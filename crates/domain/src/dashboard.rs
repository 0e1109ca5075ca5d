use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::project::percentage;
use crate::{Project, Resource, ResourceAllocation, Task, TaskStatus};

/// Portfolio-wide counters shown on the landing dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Live tasks.
    pub total_tasks: u64,
    /// Tasks in Done.
    pub tasks_done: u64,
    /// Tasks in In Progress.
    pub tasks_in_progress: u64,
    /// Tasks in Backlog.
    pub tasks_backlog: u64,
    /// Tasks in Cancelled.
    pub tasks_cancelled: u64,
    /// Done share of live tasks, in percent.
    pub overall_completion_rate_pct: f64,
    /// Sum of task estimates.
    pub total_estimated_hrs: f64,
    /// Sum of task actuals.
    pub total_actual_hrs: f64,
    /// Actual minus estimate.
    pub total_hours_variance: f64,
    /// Live projects.
    pub total_projects: u64,
    /// Live projects owning at least one live task.
    pub projects_with_tasks: u64,
    /// Live, active resources.
    pub active_resources: u64,
    /// Active resources whose allocation exceeds capacity.
    pub overallocated_resources: u64,
    /// Computation time.
    pub calculated_at: DateTime<Utc>,
}

impl DashboardMetrics {
    /// Computes metrics, skipping soft-deleted rows.
    #[must_use]
    pub fn compute(
        projects: &[Project],
        tasks: &[Task],
        resources: &[Resource],
        now: DateTime<Utc>,
    ) -> Self {
        let live_projects: Vec<&Project> = projects.iter().filter(|project| !project.is_deleted()).collect();
        let live_project_ids: HashSet<_> = live_projects.iter().map(|project| project.id).collect();
        let live_tasks: Vec<&Task> = tasks
            .iter()
            .filter(|task| !task.is_deleted() && live_project_ids.contains(&task.project_id))
            .collect();

        let count_status = |status: TaskStatus| {
            live_tasks.iter().filter(|task| task.status == status).count() as u64
        };
        let total_tasks = live_tasks.len() as u64;
        let tasks_done = count_status(TaskStatus::Done);
        let total_estimated_hrs: f64 = live_tasks.iter().map(|task| task.total_estimate_hrs()).sum();
        let total_actual_hrs: f64 = live_tasks.iter().map(|task| task.total_actual_hrs()).sum();
        let projects_with_tasks = live_tasks
            .iter()
            .map(|task| task.project_id)
            .collect::<HashSet<_>>()
            .len() as u64;

        let active_resources: Vec<&Resource> = resources
            .iter()
            .filter(|resource| !resource.is_deleted() && resource.is_active)
            .collect();
        let overallocated_resources = active_resources
            .iter()
            .filter(|resource| {
                ResourceAllocation::compute(resource, live_tasks.iter().copied()).is_overallocated
            })
            .count() as u64;

        Self {
            total_tasks,
            tasks_done,
            tasks_in_progress: count_status(TaskStatus::InProgress),
            tasks_backlog: count_status(TaskStatus::Backlog),
            tasks_cancelled: count_status(TaskStatus::Cancelled),
            overall_completion_rate_pct: percentage(tasks_done as f64, total_tasks as f64),
            total_estimated_hrs,
            total_actual_hrs,
            total_hours_variance: total_actual_hrs - total_estimated_hrs,
            total_projects: live_projects.len() as u64,
            projects_with_tasks,
            active_resources: active_resources.len() as u64,
            overallocated_resources,
            calculated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::DashboardMetrics;
    use crate::{Project, ProjectInput, Resource, ResourceInput, Task, TaskInput, TaskStatus};

    #[test]
    fn empty_portfolio_is_all_zeroes() {
        let metrics = DashboardMetrics::compute(&[], &[], &[], Utc::now());
        assert_eq!(metrics.total_tasks, 0);
        assert_eq!(metrics.overall_completion_rate_pct, 0.0);
        assert_eq!(metrics.total_projects, 0);
    }

    #[test]
    fn counts_live_rows_and_overallocation() {
        let now = Utc::now();
        let project = Project::new(
            ProjectInput {
                project_code: "PRJ-1".to_owned(),
                name: "One".to_owned(),
                ..ProjectInput::default()
            },
            now,
        )
        .unwrap_or_else(|_| unreachable!());
        let mut idle = Project::new(
            ProjectInput {
                project_code: "PRJ-2".to_owned(),
                name: "Two".to_owned(),
                ..ProjectInput::default()
            },
            now,
        )
        .unwrap_or_else(|_| unreachable!());
        assert!(idle.soft_delete(now).is_ok());

        let resource = Resource::new(
            ResourceInput {
                resource_name: "Busy".to_owned(),
                weekly_capacity_hrs: Some(10),
                ..ResourceInput::default()
            },
            now,
        )
        .unwrap_or_else(|_| unreachable!());

        let heavy = Task::new(
            TaskInput {
                task_code: "TSK-1".to_owned(),
                project_id: project.id,
                task_name: "Heavy".to_owned(),
                resource1_id: Some(resource.id),
                r1_estimate_hrs: Some(12.0),
                ..TaskInput::default()
            },
            now,
        )
        .unwrap_or_else(|_| unreachable!());
        let mut deleted = heavy.clone();
        deleted.id = uuid::Uuid::new_v4();
        deleted.deleted_at = Some(now);
        deleted.status = TaskStatus::Cancelled;

        let metrics = DashboardMetrics::compute(
            &[project, idle],
            &[heavy, deleted],
            &[resource],
            now,
        );

        assert_eq!(metrics.total_projects, 1);
        assert_eq!(metrics.total_tasks, 1);
        assert_eq!(metrics.tasks_backlog, 1);
        assert_eq!(metrics.projects_with_tasks, 1);
        assert_eq!(metrics.total_estimated_hrs, 12.0);
        assert_eq!(metrics.total_hours_variance, -12.0);
        assert_eq!(metrics.active_resources, 1);
        assert_eq!(metrics.overallocated_resources, 1);
    }
}
