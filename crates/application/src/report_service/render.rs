use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use gerbil_core::{AppError, AppResult};
use gerbil_domain::{
    ProjectProgress, ProjectStatus, ReportFormat, ReportJob, ReportType, ResourceAllocation,
    TaskStatus,
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::dashboard_service::DashboardService;
use crate::governance_ports::GovernanceRepository;
use crate::tracking_ports::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};

/// Test runs exported per project.
const TEST_RESULTS_PER_PROJECT: usize = 100;

/// Column-ordered rows of one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ReportTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportTable {
    fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| ((*column).to_owned(), value.clone()))
                    .collect();
                Value::Object(record)
            })
            .collect()
    }
}

/// Reads report rows from the tracking and governance repositories.
#[derive(Clone)]
pub(crate) struct ReportSources {
    pub projects: Arc<dyn ProjectRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub governance: Arc<dyn GovernanceRepository>,
    pub dashboard: DashboardService,
}

fn filter_text<'a>(filters: &'a Value, key: &str) -> Option<&'a str> {
    filters
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn filter_uuid(filters: &Value, key: &str) -> AppResult<Option<Uuid>> {
    filter_text(filters, key)
        .map(|value| {
            Uuid::parse_str(value).map_err(|_| {
                AppError::Validation(format!("filter '{key}' must be a UUID, got '{value}'"))
            })
        })
        .transpose()
}

impl ReportSources {
    pub async fn table(&self, job: &ReportJob) -> AppResult<ReportTable> {
        match job.report_type {
            ReportType::ProjectStatus => self.project_status(&job.filters).await,
            ReportType::ResourceUtilization => self.resource_utilization(&job.filters).await,
            ReportType::TaskExport => self.task_export(&job.filters).await,
            ReportType::TestResults => self.test_results(&job.filters).await,
            ReportType::Dashboard => self.dashboard().await,
        }
    }

    async fn project_status(&self, filters: &Value) -> AppResult<ReportTable> {
        let status = filter_text(filters, "status")
            .map(ProjectStatus::from_str)
            .transpose()?;
        let mut table = ReportTable::new(&[
            "id",
            "project_id",
            "name",
            "priority",
            "status",
            "total_weight",
            "start_date",
            "target_date",
            "total_tasks",
            "tasks_done",
            "completion_pct",
        ]);

        for project in self.projects.list_projects(false).await? {
            if status.is_some_and(|status| project.status != status) {
                continue;
            }
            let tasks = self
                .tasks
                .list_tasks(TaskQuery::for_project(project.id))
                .await?;
            let progress = ProjectProgress::from_tasks(&tasks);
            table.push(vec![
                json!(project.id),
                json!(project.project_code.as_str()),
                json!(project.name.as_str()),
                json!(project.priority.as_str()),
                json!(project.status.as_str()),
                json!(project.total_weight.value()),
                json!(project.start_date),
                json!(project.target_date),
                json!(progress.total_tasks),
                json!(progress.tasks_done),
                json!(progress.completion_pct),
            ]);
        }

        Ok(table)
    }

    async fn resource_utilization(&self, filters: &Value) -> AppResult<ReportTable> {
        let department = filter_text(filters, "department");
        let mut table = ReportTable::new(&[
            "id",
            "resource_name",
            "role",
            "department",
            "weekly_capacity_hrs",
            "current_allocation_hrs",
            "active_task_count",
            "utilization_pct",
            "is_overallocated",
        ]);

        for resource in self.resources.list_resources(false).await? {
            if department.is_some_and(|department| {
                !resource
                    .department
                    .as_deref()
                    .is_some_and(|value| value.eq_ignore_ascii_case(department))
            }) {
                continue;
            }
            let tasks = self
                .tasks
                .list_tasks(TaskQuery::for_resource(resource.id))
                .await?;
            let allocation = ResourceAllocation::compute(&resource, &tasks);
            table.push(vec![
                json!(resource.id),
                json!(resource.resource_name.as_str()),
                json!(resource.role),
                json!(resource.department),
                json!(resource.weekly_capacity_hrs.hours()),
                json!(allocation.current_allocation_hrs),
                json!(allocation.active_task_count),
                json!(allocation.utilization_pct),
                json!(allocation.is_overallocated),
            ]);
        }

        Ok(table)
    }

    async fn task_export(&self, filters: &Value) -> AppResult<ReportTable> {
        let query = TaskQuery {
            project_id: filter_uuid(filters, "project_id")?,
            resource_id: filter_uuid(filters, "resource_id")?,
            status: filter_text(filters, "status")
                .map(TaskStatus::from_str)
                .transpose()?,
            include_deleted: false,
        };
        let today = Utc::now().date_naive();
        let mut table = ReportTable::new(&[
            "id",
            "task_id",
            "project_id",
            "task_name",
            "status",
            "priority",
            "resource1_uuid",
            "resource2_uuid",
            "total_estimate_hrs",
            "total_actual_hrs",
            "hours_variance",
            "deadline",
            "completed_date",
            "is_overdue",
        ]);

        for task in self.tasks.list_tasks(query).await? {
            table.push(vec![
                json!(task.id),
                json!(task.task_code.as_str()),
                json!(task.project_id),
                json!(task.task_name.as_str()),
                json!(task.status.as_str()),
                json!(task.priority.as_str()),
                json!(task.resource1_id),
                json!(task.resource2_id),
                json!(task.total_estimate_hrs()),
                json!(task.total_actual_hrs()),
                json!(task.hours_variance()),
                json!(task.deadline),
                json!(task.completed_date),
                json!(task.is_overdue(today)),
            ]);
        }

        Ok(table)
    }

    async fn test_results(&self, filters: &Value) -> AppResult<ReportTable> {
        let project_ids = match filter_uuid(filters, "project_id")? {
            Some(project_id) => vec![project_id],
            None => self
                .projects
                .list_projects(false)
                .await?
                .into_iter()
                .map(|project| project.id)
                .collect(),
        };
        let mut table = ReportTable::new(&[
            "run_id",
            "project_id",
            "executed_at",
            "total_tests",
            "passed",
            "failed",
            "not_run",
            "pass_rate_pct",
            "critical_defects",
            "test_coverage_pct",
        ]);

        for project_id in project_ids {
            for run in self
                .governance
                .list_test_runs(project_id, TEST_RESULTS_PER_PROJECT)
                .await?
            {
                table.push(vec![
                    json!(run.id),
                    json!(run.project_id),
                    json!(run.executed_at),
                    json!(run.total_tests),
                    json!(run.passed),
                    json!(run.failed),
                    json!(run.not_run),
                    json!(run.pass_rate_pct()),
                    json!(run.critical_defects),
                    json!(run.test_coverage_pct),
                ]);
            }
        }

        Ok(table)
    }

    async fn dashboard(&self) -> AppResult<ReportTable> {
        let metrics = self.dashboard.metrics().await?;
        let mut table = ReportTable::new(&[
            "total_projects",
            "projects_with_tasks",
            "total_tasks",
            "tasks_done",
            "tasks_in_progress",
            "tasks_backlog",
            "tasks_cancelled",
            "overall_completion_rate_pct",
            "total_estimated_hrs",
            "total_actual_hrs",
            "total_hours_variance",
            "active_resources",
            "overallocated_resources",
            "calculated_at",
        ]);
        table.push(vec![
            json!(metrics.total_projects),
            json!(metrics.projects_with_tasks),
            json!(metrics.total_tasks),
            json!(metrics.tasks_done),
            json!(metrics.tasks_in_progress),
            json!(metrics.tasks_backlog),
            json!(metrics.tasks_cancelled),
            json!(metrics.overall_completion_rate_pct),
            json!(metrics.total_estimated_hrs),
            json!(metrics.total_actual_hrs),
            json!(metrics.total_hours_variance),
            json!(metrics.active_resources),
            json!(metrics.overallocated_resources),
            json!(metrics.calculated_at),
        ]);

        Ok(table)
    }
}

/// Encodes a table in the job's format.
pub(crate) fn encode(job: &ReportJob, table: &ReportTable) -> AppResult<String> {
    match job.format {
        ReportFormat::Json => encode_json(job, table),
        ReportFormat::Csv => Ok(encode_csv(table)),
        ReportFormat::Xlsx | ReportFormat::Pdf => Err(AppError::Validation(format!(
            "{} reports need an external renderer",
            job.format.as_str()
        ))),
    }
}

fn encode_json(job: &ReportJob, table: &ReportTable) -> AppResult<String> {
    serde_json::to_string_pretty(&json!({
        "report_type": job.report_type.as_str(),
        "generated_at": Utc::now(),
        "filters": job.filters,
        "row_count": table.rows.len(),
        "rows": table.records(),
    }))
    .map_err(|error| AppError::Internal(format!("failed to encode report as json: {error}")))
}

fn csv_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

pub(crate) fn encode_csv(table: &ReportTable) -> String {
    let mut output = table.columns.join(",");
    output.push_str("\r\n");
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(csv_cell).collect();
        output.push_str(&cells.join(","));
        output.push_str("\r\n");
    }

    output
}
