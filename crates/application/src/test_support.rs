use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{
    Approval, Project, ProjectInput, QualityGate, ReportJob, ReportStatus, Resource,
    ResourceInput, Task, TaskInput, TestRunSummary,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::audit_ports::{AuditEntry, AuditEvent, AuditLogQuery, AuditRepository};
use crate::audit_service::AuditTrail;
use crate::governance_ports::GovernanceRepository;
use crate::governance_service::GovernanceService;
use crate::project_service::ProjectService;
use crate::report_ports::{ReportJobPage, ReportJobQuery, ReportJobRepository};
use crate::report_service::{ReportDataSources, ReportExecutionMode, ReportService};
use crate::resource_service::ResourceService;
use crate::task_service::TaskService;
use crate::tracking_ports::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};
use crate::workflow_hooks::WorkflowHooks;
use crate::workflow_ports::{WorkflowEvent, WorkflowNotifier};

#[derive(Default)]
pub(crate) struct FakeProjects {
    rows: Mutex<Vec<Project>>,
}

#[async_trait]
impl ProjectRepository for FakeProjects {
    async fn insert_project(&self, project: &Project) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|row| {
            !row.is_deleted() && row.project_code.as_str() == project.project_code.as_str()
        }) {
            return Err(AppError::Conflict("duplicate project code".to_owned()));
        }
        rows.push(project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == project.id)
            .ok_or_else(|| AppError::NotFound("project".to_owned()))?;
        *row = project.clone();
        Ok(())
    }

    async fn find_project(&self, project_id: Uuid) -> AppResult<Option<Project>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == project_id)
            .cloned())
    }

    async fn list_projects(&self, include_deleted: bool) -> AppResult<Vec<Project>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .rev()
            .filter(|row| include_deleted || !row.is_deleted())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeResources {
    rows: Mutex<Vec<Resource>>,
}

#[async_trait]
impl ResourceRepository for FakeResources {
    async fn insert_resource(&self, resource: &Resource) -> AppResult<()> {
        self.rows.lock().await.push(resource.clone());
        Ok(())
    }

    async fn update_resource(&self, resource: &Resource) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == resource.id)
            .ok_or_else(|| AppError::NotFound("resource".to_owned()))?;
        *row = resource.clone();
        Ok(())
    }

    async fn find_resource(&self, resource_id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == resource_id)
            .cloned())
    }

    async fn list_resources(&self, include_deleted: bool) -> AppResult<Vec<Resource>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|row| include_deleted || !row.is_deleted())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeTasks {
    rows: Mutex<Vec<Task>>,
}

#[async_trait]
impl TaskRepository for FakeTasks {
    async fn insert_task(&self, task: &Task) -> AppResult<()> {
        self.rows.lock().await.push(task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == task.id)
            .ok_or_else(|| AppError::NotFound("task".to_owned()))?;
        *row = task.clone();
        Ok(())
    }

    async fn find_task(&self, task_id: Uuid) -> AppResult<Option<Task>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == task_id)
            .cloned())
    }

    async fn list_tasks(&self, query: TaskQuery) -> AppResult<Vec<Task>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .rev()
            .filter(|row| query.matches(row))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeGovernance {
    gates: Mutex<Vec<QualityGate>>,
    approvals: Mutex<Vec<Approval>>,
    runs: Mutex<Vec<TestRunSummary>>,
}

#[async_trait]
impl GovernanceRepository for FakeGovernance {
    async fn find_quality_gate(&self, project_id: Uuid) -> AppResult<Option<QualityGate>> {
        Ok(self
            .gates
            .lock()
            .await
            .iter()
            .find(|gate| gate.project_id == project_id)
            .cloned())
    }

    async fn save_quality_gate(&self, gate: &QualityGate) -> AppResult<()> {
        let mut gates = self.gates.lock().await;
        gates.retain(|stored| stored.project_id != gate.project_id);
        gates.push(gate.clone());
        Ok(())
    }

    async fn insert_approval(&self, approval: &Approval) -> AppResult<()> {
        self.approvals.lock().await.push(approval.clone());
        Ok(())
    }

    async fn list_approvals(&self, project_id: Uuid) -> AppResult<Vec<Approval>> {
        Ok(self
            .approvals
            .lock()
            .await
            .iter()
            .rev()
            .filter(|approval| approval.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_test_run(&self, run: &TestRunSummary) -> AppResult<()> {
        self.runs.lock().await.push(run.clone());
        Ok(())
    }

    async fn list_test_runs(
        &self,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<TestRunSummary>> {
        let mut runs: Vec<TestRunSummary> = self
            .runs
            .lock()
            .await
            .iter()
            .filter(|run| run.project_id == project_id)
            .cloned()
            .collect();
        runs.sort_by(|left, right| right.executed_at.cmp(&left.executed_at));
        runs.truncate(limit);
        Ok(runs)
    }
}

#[derive(Default)]
pub(crate) struct FakeReportJobs {
    rows: Mutex<Vec<ReportJob>>,
}

#[async_trait]
impl ReportJobRepository for FakeReportJobs {
    async fn insert_job(&self, job: &ReportJob) -> AppResult<()> {
        self.rows.lock().await.push(job.clone());
        Ok(())
    }

    async fn update_job(&self, job: &ReportJob) -> AppResult<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.job_id == job.job_id)
            .ok_or_else(|| AppError::NotFound("report job".to_owned()))?;
        *row = job.clone();
        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> AppResult<Option<ReportJob>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|row| row.job_id == job_id)
            .cloned())
    }

    async fn list_jobs(&self, query: &ReportJobQuery) -> AppResult<ReportJobPage> {
        let rows = self.rows.lock().await;
        let matching: Vec<&ReportJob> = rows.iter().rev().filter(|job| query.matches(job)).collect();
        Ok(ReportJobPage {
            total: matching.len() as u64,
            jobs: matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }

    async fn claim_jobs(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ReportJob>> {
        let now = Utc::now();
        let mut claimed = Vec::new();
        for job in self.rows.lock().await.iter_mut() {
            if claimed.len() == limit {
                break;
            }
            let lease_free = job.lease_expires_at.is_none_or(|expiry| expiry <= now);
            if job.status == ReportStatus::Processing && lease_free {
                job.claimed_by = Some(worker_id.to_owned());
                job.lease_expires_at = Some(now + Duration::seconds(i64::from(lease_seconds)));
                claimed.push(job.clone());
            }
        }

        Ok(claimed)
    }
}

#[derive(Default)]
pub(crate) struct FakeAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl FakeAudit {
    pub(crate) async fn events(&self) -> Vec<AuditEvent> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|entry| entry.event.clone())
            .collect()
    }
}

#[async_trait]
impl AuditRepository for FakeAudit {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.entries.lock().await.push(AuditEntry {
            id: Uuid::new_v4(),
            event,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_entries(&self, query: &AuditLogQuery) -> AppResult<Vec<AuditEntry>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .rev()
            .filter(|entry| query.matches(entry))
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingNotifier {
    pub(crate) async fn kinds(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .await
            .iter()
            .map(|event| event.kind.as_str())
            .collect()
    }
}

#[async_trait]
impl WorkflowNotifier for RecordingNotifier {
    async fn notify(&self, event: WorkflowEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// Shared fakes with every service wired over them.
#[derive(Default)]
pub(crate) struct Harness {
    pub projects: Arc<FakeProjects>,
    pub resources: Arc<FakeResources>,
    pub tasks: Arc<FakeTasks>,
    pub governance: Arc<FakeGovernance>,
    pub jobs: Arc<FakeReportJobs>,
    pub audit: Arc<FakeAudit>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub(crate) fn actor() -> Actor {
        Actor::from_optional(Some("qa@gerbil.qc"))
    }

    fn trail(&self) -> AuditTrail {
        AuditTrail::new(self.audit.clone())
    }

    fn hooks(&self) -> WorkflowHooks {
        WorkflowHooks::new(self.notifier.clone())
    }

    pub(crate) fn project_service(&self) -> ProjectService {
        ProjectService::new(
            self.projects.clone(),
            self.tasks.clone(),
            self.trail(),
            self.hooks(),
        )
    }

    pub(crate) fn resource_service(&self) -> ResourceService {
        ResourceService::new(self.resources.clone(), self.tasks.clone(), self.trail())
    }

    pub(crate) fn task_service(&self) -> TaskService {
        TaskService::new(
            self.tasks.clone(),
            self.projects.clone(),
            self.resources.clone(),
            self.trail(),
            self.hooks(),
        )
    }

    pub(crate) fn governance_service(&self) -> GovernanceService {
        GovernanceService::new(
            self.governance.clone(),
            self.projects.clone(),
            self.tasks.clone(),
            self.trail(),
            self.hooks(),
        )
    }

    pub(crate) fn report_service(&self, mode: ReportExecutionMode) -> ReportService {
        ReportService::new(
            self.jobs.clone(),
            ReportDataSources {
                projects: self.projects.clone(),
                resources: self.resources.clone(),
                tasks: self.tasks.clone(),
                governance: self.governance.clone(),
            },
            self.hooks(),
            mode,
            "http://localhost:3001",
        )
    }

    pub(crate) async fn project(&self, code: &str) -> Project {
        self.project_service()
            .create_project(
                &Self::actor(),
                ProjectInput {
                    project_code: code.to_owned(),
                    name: format!("Project {code}"),
                    ..ProjectInput::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!())
            .project
    }

    pub(crate) async fn resource(&self, name: &str, capacity: i64) -> Resource {
        self.resource_service()
            .create_resource(
                &Self::actor(),
                ResourceInput {
                    resource_name: name.to_owned(),
                    weekly_capacity_hrs: Some(capacity),
                    ..ResourceInput::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!())
            .resource
    }

    pub(crate) fn task_input(code: &str, project_id: Uuid) -> TaskInput {
        TaskInput {
            task_code: code.to_owned(),
            project_id,
            task_name: format!("Task {code}"),
            ..TaskInput::default()
        }
    }
}
