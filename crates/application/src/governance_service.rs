use std::sync::Arc;

use chrono::{DateTime, Utc};
use gerbil_core::{Actor, AppError, AppResult};
use gerbil_domain::{
    Approval, ApprovalInput, AuditAction, AuditEntityType, GateEvaluation, GateMetrics,
    HealthStatus, Project, ProjectProgress, QualityGate, QualityGateInput, ReadinessStatus,
    RiskFlag, RiskLevel, TestRunInput, TestRunSummary, assess_readiness, detect_risk_flags,
};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::audit_service::{AuditTrail, AuditedWrite};
use crate::governance_ports::GovernanceRepository;
use crate::tracking_ports::{ProjectRepository, TaskQuery, TaskRepository};
use crate::workflow_hooks::WorkflowHooks;
use crate::workflow_ports::WorkflowEventKind;


/// Most test runs returned by one listing.
pub const TEST_RUN_PAGE_SIZE: usize = 50;

/// Release readiness of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReadiness {
    /// Project storage id.
    pub project_id: Uuid,
    /// Project display code.
    pub project_code: String,
    /// Project name.
    pub project_name: String,
    /// Verdict.
    pub status: ReadinessStatus,
    /// Reasons behind a non-green verdict.
    pub blocking_issues: Vec<String>,
    /// Gate the verdict was computed with.
    pub gate: QualityGate,
    /// Most recent test run, if any.
    pub latest_run: Option<TestRunSummary>,
    /// Assessment time.
    pub assessed_at: DateTime<Utc>,
}

/// Quality risk indicators of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRisk {
    /// Project storage id.
    pub project_id: Uuid,
    /// Project display code.
    pub project_code: String,
    /// Project name.
    pub project_name: String,
    /// Raised flags.
    pub risk_flags: Vec<RiskFlag>,
    /// Severity derived from the flags.
    pub risk_level: RiskLevel,
    /// Pass rate of the latest run.
    pub latest_pass_rate_pct: Option<f64>,
    /// Pass rate of the run before it.
    pub previous_pass_rate_pct: Option<f64>,
}

/// Combined delivery and quality signal of one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectHealth {
    /// Project storage id.
    pub project_id: Uuid,
    /// Project display code.
    pub project_code: String,
    /// Project name.
    pub project_name: String,
    /// Overall signal.
    pub health_status: HealthStatus,
    /// Readiness verdict.
    pub readiness_status: ReadinessStatus,
    /// Risk severity.
    pub risk_level: RiskLevel,
    /// Task completion, in percent.
    pub completion_pct: f64,
    /// Live tasks.
    pub total_tasks: u64,
}

/// Portfolio counters for the governance landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GovernanceSummary {
    /// Live projects.
    pub total_projects: u64,
    /// Projects ready to release.
    pub ready_count: u64,
    /// Projects with stale or incomplete results.
    pub at_risk_count: u64,
    /// Projects failing their gate.
    pub blocked_count: u64,
    /// Projects without results.
    pub unknown_count: u64,
    /// Projects with critical quality risk.
    pub critical_risk_count: u64,
    /// Projects with one risk flag.
    pub warning_risk_count: u64,
    /// Projects using the default gate.
    pub default_gate_count: u64,
}

struct Assessment {
    readiness: ProjectReadiness,
    risk: ProjectRisk,
}

/// Application service for quality gates, approvals and release readiness.
#[derive(Clone)]
pub struct GovernanceService {
    governance: Arc<dyn GovernanceRepository>,
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    audit: AuditTrail,
    hooks: WorkflowHooks,
}

impl GovernanceService {
    /// Creates a new governance service.
    #[must_use]
    pub fn new(
        governance: Arc<dyn GovernanceRepository>,
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        audit: AuditTrail,
        hooks: WorkflowHooks,
    ) -> Self {
        Self {
            governance,
            projects,
            tasks,
            audit,
            hooks,
        }
    }

    /// Returns the gate of a project, falling back to the defaults.
    pub async fn quality_gate(&self, project_id: Uuid) -> AppResult<QualityGate> {
        self.load_project(project_id).await?;
        self.gate_for(project_id).await
    }

    /// Creates or replaces the gate of a live project.
    pub async fn save_quality_gate(
        &self,
        actor: &Actor,
        input: QualityGateInput,
    ) -> AppResult<QualityGate> {
        let project = self.referenced_project(input.project_id).await?;
        let before = self.governance.find_quality_gate(project.id).await?;
        let gate = QualityGate::new(input, Utc::now())?;

        self.governance.save_quality_gate(&gate).await?;
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::QualityGate,
                    entity_id: &project.id,
                    label: project.project_code.as_str(),
                    action: if before.is_some() {
                        AuditAction::Update
                    } else {
                        AuditAction::Create
                    },
                    before: before.as_ref(),
                    after: Some(&gate),
                },
            )
            .await?;

        info!(
            project_id = %project.id,
            min_pass_rate = gate.min_pass_rate,
            max_critical_defects = gate.max_critical_defects,
            min_test_coverage = gate.min_test_coverage,
            "quality gate saved"
        );
        Ok(gate)
    }

    /// Records a test run summary for a live project.
    pub async fn record_test_run(
        &self,
        actor: &Actor,
        input: TestRunInput,
    ) -> AppResult<TestRunSummary> {
        let project = self.referenced_project(input.project_id).await?;
        let run = TestRunSummary::new(input, Utc::now())?;

        self.governance.insert_test_run(&run).await?;
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::TestRun,
                    entity_id: &run.id,
                    label: project.project_code.as_str(),
                    action: AuditAction::Create,
                    before: None,
                    after: Some(&run),
                },
            )
            .await?;

        info!(
            project_id = %project.id,
            run_id = %run.id,
            pass_rate_pct = run.pass_rate_pct(),
            "test run recorded"
        );
        Ok(run)
    }

    /// Lists the recent test runs of a project, newest first.
    pub async fn list_test_runs(&self, project_id: Uuid) -> AppResult<Vec<TestRunSummary>> {
        self.load_project(project_id).await?;
        self.governance
            .list_test_runs(project_id, TEST_RUN_PAGE_SIZE)
            .await
    }

    /// Evaluates the project's gate against supplied metrics or its latest run.
    pub async fn evaluate_gate(
        &self,
        project_id: Uuid,
        metrics: Option<GateMetrics>,
    ) -> AppResult<GateEvaluation> {
        self.load_project(project_id).await?;
        let gate = self.gate_for(project_id).await?;

        let metrics = match metrics {
            Some(metrics) => metrics,
            None => self
                .governance
                .list_test_runs(project_id, 1)
                .await?
                .first()
                .map(TestRunSummary::gate_metrics)
                .ok_or_else(|| {
                    AppError::Validation(
                        "no metrics supplied and no test run recorded for this project".to_owned(),
                    )
                })?,
        };

        Ok(gate.evaluate(&metrics, Utc::now()))
    }

    /// Records a release decision. Without an explicit snapshot, the current readiness is attached.
    pub async fn submit_approval(&self, actor: &Actor, mut input: ApprovalInput) -> AppResult<Approval> {
        let project = self.referenced_project(input.project_id).await?;
        if input.gate_snapshot.is_none() {
            let assessment = self.assess(&project, Utc::now()).await?;
            input.gate_snapshot = Some(json!({
                "readiness_status": assessment.readiness.status,
                "blocking_issues": assessment.readiness.blocking_issues,
                "gate": assessment.readiness.gate,
            }));
        }

        let approval = Approval::new(input, Utc::now())?;
        self.governance.insert_approval(&approval).await?;
        self.audit
            .record(
                actor,
                AuditedWrite {
                    entity_type: AuditEntityType::Approval,
                    entity_id: &approval.id,
                    label: project.project_code.as_str(),
                    action: AuditAction::Create,
                    before: None,
                    after: Some(&approval),
                },
            )
            .await?;

        info!(
            project_id = %project.id,
            approval_id = %approval.id,
            decision = approval.status.as_str(),
            "release decision recorded"
        );
        self.hooks
            .publish(
                WorkflowEventKind::ApprovalRecorded,
                json!({
                    "approval_id": approval.id,
                    "project_id": project.id,
                    "status": approval.status.as_str(),
                    "release_version": approval.release_version,
                }),
            )
            .await;

        Ok(approval)
    }

    /// Lists release decisions of a project, newest first.
    pub async fn list_approvals(&self, project_id: Uuid) -> AppResult<Vec<Approval>> {
        self.load_project(project_id).await?;
        self.governance.list_approvals(project_id).await
    }

    /// Readiness of every live project, optionally filtered by verdict.
    pub async fn release_readiness(
        &self,
        status: Option<ReadinessStatus>,
    ) -> AppResult<Vec<ProjectReadiness>> {
        Ok(self
            .assess_all()
            .await?
            .into_iter()
            .map(|assessment| assessment.readiness)
            .filter(|readiness| status.is_none_or(|status| readiness.status == status))
            .collect())
    }

    /// Readiness of one project.
    pub async fn project_readiness(&self, project_id: Uuid) -> AppResult<ProjectReadiness> {
        let project = self.load_project(project_id).await?;
        Ok(self.assess(&project, Utc::now()).await?.readiness)
    }

    /// Quality risks of every live project, most severe first.
    pub async fn quality_risks(&self) -> AppResult<Vec<ProjectRisk>> {
        let mut risks: Vec<ProjectRisk> = self
            .assess_all()
            .await?
            .into_iter()
            .map(|assessment| assessment.risk)
            .collect();
        risks.sort_by_key(|risk| std::cmp::Reverse(risk.risk_flags.len()));
        Ok(risks)
    }

    /// Quality risks of one project.
    pub async fn project_risk(&self, project_id: Uuid) -> AppResult<ProjectRisk> {
        let project = self.load_project(project_id).await?;
        Ok(self.assess(&project, Utc::now()).await?.risk)
    }

    /// Health of every live project.
    pub async fn project_health(&self) -> AppResult<Vec<ProjectHealth>> {
        let now = Utc::now();
        let mut health = Vec::new();
        for project in self.projects.list_projects(false).await? {
            health.push(self.health_of(&project, now).await?);
        }

        Ok(health)
    }

    /// Health of one project.
    pub async fn project_health_for(&self, project_id: Uuid) -> AppResult<ProjectHealth> {
        let project = self.load_project(project_id).await?;
        self.health_of(&project, Utc::now()).await
    }

    /// Portfolio readiness and risk counters.
    pub async fn dashboard_summary(&self) -> AppResult<GovernanceSummary> {
        let mut summary = GovernanceSummary::default();
        for assessment in self.assess_all().await? {
            summary.total_projects += 1;
            match assessment.readiness.status {
                ReadinessStatus::Green => summary.ready_count += 1,
                ReadinessStatus::Amber => summary.at_risk_count += 1,
                ReadinessStatus::Red => summary.blocked_count += 1,
                ReadinessStatus::Unknown => summary.unknown_count += 1,
            }
            match assessment.risk.risk_level {
                RiskLevel::Critical => summary.critical_risk_count += 1,
                RiskLevel::Warning => summary.warning_risk_count += 1,
                RiskLevel::Normal => {}
            }
            if assessment.readiness.gate.is_default {
                summary.default_gate_count += 1;
            }
        }

        Ok(summary)
    }

    async fn health_of(&self, project: &Project, now: DateTime<Utc>) -> AppResult<ProjectHealth> {
        let assessment = self.assess(project, now).await?;
        let tasks = self.tasks.list_tasks(TaskQuery::for_project(project.id)).await?;
        let progress = ProjectProgress::from_tasks(&tasks);

        Ok(ProjectHealth {
            project_id: project.id,
            project_code: project.project_code.as_str().to_owned(),
            project_name: project.name.as_str().to_owned(),
            health_status: HealthStatus::combine(
                assessment.readiness.status,
                assessment.risk.risk_level,
            ),
            readiness_status: assessment.readiness.status,
            risk_level: assessment.risk.risk_level,
            completion_pct: progress.completion_pct,
            total_tasks: progress.total_tasks,
        })
    }

    async fn assess_all(&self) -> AppResult<Vec<Assessment>> {
        let now = Utc::now();
        let mut assessments = Vec::new();
        for project in self.projects.list_projects(false).await? {
            assessments.push(self.assess(&project, now).await?);
        }

        Ok(assessments)
    }

    async fn assess(&self, project: &Project, now: DateTime<Utc>) -> AppResult<Assessment> {
        let gate = self.gate_for(project.id).await?;
        let runs = self.governance.list_test_runs(project.id, 2).await?;
        let latest = runs.first();
        let previous = runs.get(1);

        let verdict = assess_readiness(&gate, latest, now);
        let risk_flags = detect_risk_flags(latest, previous, now);
        let project_code = project.project_code.as_str().to_owned();
        let project_name = project.name.as_str().to_owned();

        Ok(Assessment {
            risk: ProjectRisk {
                project_id: project.id,
                project_code: project_code.clone(),
                project_name: project_name.clone(),
                risk_level: RiskLevel::from_flags(&risk_flags),
                risk_flags,
                latest_pass_rate_pct: latest.map(TestRunSummary::pass_rate_pct),
                previous_pass_rate_pct: previous.map(TestRunSummary::pass_rate_pct),
            },
            readiness: ProjectReadiness {
                project_id: project.id,
                project_code,
                project_name,
                status: verdict.status,
                blocking_issues: verdict.blocking_issues,
                gate,
                latest_run: latest.cloned(),
                assessed_at: now,
            },
        })
    }

    async fn gate_for(&self, project_id: Uuid) -> AppResult<QualityGate> {
        Ok(self
            .governance
            .find_quality_gate(project_id)
            .await?
            .unwrap_or_else(|| QualityGate::defaults(project_id)))
    }

    async fn load_project(&self, project_id: Uuid) -> AppResult<Project> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    async fn referenced_project(&self, project_id: Uuid) -> AppResult<Project> {
        match self.projects.find_project(project_id).await? {
            Some(project) if !project.is_deleted() => Ok(project),
            _ => Err(AppError::Validation(format!(
                "project_id '{project_id}' does not reference an active project"
            ))),
        }
    }
}
