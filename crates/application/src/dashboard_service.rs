use std::sync::Arc;

use chrono::Utc;
use gerbil_core::AppResult;
use gerbil_domain::DashboardMetrics;

use crate::tracking_ports::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};

/// Computes portfolio metrics from the tracking repositories.
#[derive(Clone)]
pub struct DashboardService {
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    resources: Arc<dyn ResourceRepository>,
}

impl DashboardService {
    /// Creates a new dashboard service.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        resources: Arc<dyn ResourceRepository>,
    ) -> Self {
        Self {
            projects,
            tasks,
            resources,
        }
    }

    /// Current metrics over live rows.
    pub async fn metrics(&self) -> AppResult<DashboardMetrics> {
        let projects = self.projects.list_projects(false).await?;
        let tasks = self.tasks.list_tasks(TaskQuery::default()).await?;
        let resources = self.resources.list_resources(false).await?;

        Ok(DashboardMetrics::compute(
            &projects,
            &tasks,
            &resources,
            Utc::now(),
        ))
    }
}
