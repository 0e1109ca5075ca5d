use std::collections::HashMap;

use async_trait::async_trait;
use gerbil_application::GovernanceRepository;
use gerbil_core::AppResult;
use gerbil_domain::{Approval, QualityGate, TestRunSummary};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory quality gate, approval and test run repository.
#[derive(Debug, Default)]
pub struct InMemoryGovernanceRepository {
    gates: RwLock<HashMap<Uuid, QualityGate>>,
    approvals: RwLock<Vec<Approval>>,
    test_runs: RwLock<Vec<TestRunSummary>>,
}

impl InMemoryGovernanceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GovernanceRepository for InMemoryGovernanceRepository {
    async fn find_quality_gate(&self, project_id: Uuid) -> AppResult<Option<QualityGate>> {
        Ok(self.gates.read().await.get(&project_id).cloned())
    }

    async fn save_quality_gate(&self, gate: &QualityGate) -> AppResult<()> {
        self.gates
            .write()
            .await
            .insert(gate.project_id, gate.clone());
        Ok(())
    }

    async fn insert_approval(&self, approval: &Approval) -> AppResult<()> {
        self.approvals.write().await.push(approval.clone());
        Ok(())
    }

    async fn list_approvals(&self, project_id: Uuid) -> AppResult<Vec<Approval>> {
        Ok(self
            .approvals
            .read()
            .await
            .iter()
            .rev()
            .filter(|approval| approval.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_test_run(&self, run: &TestRunSummary) -> AppResult<()> {
        self.test_runs.write().await.push(run.clone());
        Ok(())
    }

    async fn list_test_runs(
        &self,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<TestRunSummary>> {
        let mut runs: Vec<TestRunSummary> = self
            .test_runs
            .read()
            .await
            .iter()
            .filter(|run| run.project_id == project_id)
            .cloned()
            .collect();
        runs.sort_by(|left, right| {
            right
                .executed_at
                .cmp(&left.executed_at)
                .then_with(|| right.created_at.cmp(&left.created_at))
        });
        runs.truncate(limit);

        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use gerbil_application::GovernanceRepository;
    use gerbil_domain::{QualityGate, QualityGateInput, TestRunInput, TestRunSummary};
    use uuid::Uuid;

    use super::InMemoryGovernanceRepository;

    fn run(project_id: Uuid, days_ago: i64) -> TestRunSummary {
        TestRunSummary::new(
            TestRunInput {
                project_id,
                executed_at: Some(Utc::now() - Duration::days(days_ago)),
                total_tests: Some(10),
                passed: 9,
                failed: 1,
                not_run: None,
                critical_defects: None,
                test_coverage_pct: None,
            },
            Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn gates_are_replaced_per_project() {
        let repository = InMemoryGovernanceRepository::new();
        let project_id = Uuid::new_v4();
        for min_pass_rate in [90.0, 97.5] {
            let gate = QualityGate::new(
                QualityGateInput {
                    project_id,
                    min_pass_rate: Some(min_pass_rate),
                    max_critical_defects: None,
                    min_test_coverage: None,
                },
                Utc::now(),
            )
            .unwrap_or_else(|_| unreachable!());
            assert!(repository.save_quality_gate(&gate).await.is_ok());
        }

        let stored = repository
            .find_quality_gate(project_id)
            .await
            .unwrap_or_default();
        assert_eq!(stored.map(|gate| gate.min_pass_rate), Some(97.5));
    }

    #[tokio::test]
    async fn test_runs_are_newest_execution_first() {
        let repository = InMemoryGovernanceRepository::new();
        let project_id = Uuid::new_v4();
        let old = run(project_id, 10);
        let recent = run(project_id, 1);
        assert!(repository.insert_test_run(&recent).await.is_ok());
        assert!(repository.insert_test_run(&old).await.is_ok());
        assert!(repository.insert_test_run(&run(Uuid::new_v4(), 0)).await.is_ok());

        let runs = repository
            .list_test_runs(project_id, 1)
            .await
            .unwrap_or_default();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, recent.id);
    }
}
