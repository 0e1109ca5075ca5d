use async_trait::async_trait;
use gerbil_core::AppResult;
use gerbil_domain::{Approval, QualityGate, TestRunSummary};
use uuid::Uuid;

/// Port for quality gates, release approvals and test run summaries.
#[async_trait]
pub trait GovernanceRepository: Send + Sync {
    /// Finds the stored gate of a project.
    async fn find_quality_gate(&self, project_id: Uuid) -> AppResult<Option<QualityGate>>;

    /// Inserts or replaces the gate of a project.
    async fn save_quality_gate(&self, gate: &QualityGate) -> AppResult<()>;

    /// Appends an approval decision.
    async fn insert_approval(&self, approval: &Approval) -> AppResult<()>;

    /// Lists approval decisions of a project, newest first.
    async fn list_approvals(&self, project_id: Uuid) -> AppResult<Vec<Approval>>;

    /// Appends a test run summary.
    async fn insert_test_run(&self, run: &TestRunSummary) -> AppResult<()>;

    /// Lists the most recent test runs of a project, newest execution first.
    async fn list_test_runs(&self, project_id: Uuid, limit: usize)
    -> AppResult<Vec<TestRunSummary>>;
}
