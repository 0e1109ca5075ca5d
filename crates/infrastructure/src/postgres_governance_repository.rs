use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gerbil_application::GovernanceRepository;
use gerbil_core::{AppError, AppResult, NonEmptyString};
use gerbil_domain::{Approval, ApprovalDecision, QualityGate, TestRunSummary};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// PostgreSQL-backed quality gate, approval and test run repository.
#[derive(Clone)]
pub struct PostgresGovernanceRepository {
    pool: PgPool,
}

impl PostgresGovernanceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn count_from_storage(value: i32, field: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|error| AppError::Internal(format!("invalid stored {field} '{value}': {error}")))
}

fn count_for_storage(value: u32, field: &str) -> AppResult<i32> {
    i32::try_from(value)
        .map_err(|error| AppError::Validation(format!("{field} is too large to store: {error}")))
}

#[derive(Debug, FromRow)]
struct QualityGateRow {
    project_id: Uuid,
    min_pass_rate: f64,
    max_critical_defects: i32,
    min_test_coverage: f64,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QualityGateRow> for QualityGate {
    type Error = AppError;

    fn try_from(row: QualityGateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: row.project_id,
            min_pass_rate: row.min_pass_rate,
            max_critical_defects: count_from_storage(
                row.max_critical_defects,
                "max_critical_defects",
            )?,
            min_test_coverage: row.min_test_coverage,
            is_default: false,
            updated_at: Some(row.updated_at),
        })
    }
}

#[derive(Debug, FromRow)]
struct ApprovalRow {
    id: Uuid,
    project_id: Uuid,
    release_version: Option<String>,
    status: String,
    comment: String,
    approver_name: Option<String>,
    gate_snapshot: Option<Json<Value>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ApprovalRow> for Approval {
    type Error = AppError;

    fn try_from(row: ApprovalRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            release_version: row.release_version,
            status: ApprovalDecision::from_str(&row.status)?,
            comment: NonEmptyString::new(row.comment)?,
            approver_name: row.approver_name,
            gate_snapshot: row.gate_snapshot.map(|snapshot| snapshot.0),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TestRunRow {
    id: Uuid,
    project_id: Uuid,
    executed_at: DateTime<Utc>,
    total_tests: i32,
    passed: i32,
    failed: i32,
    not_run: i32,
    critical_defects: i32,
    test_coverage_pct: Option<f64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TestRunRow> for TestRunSummary {
    type Error = AppError;

    fn try_from(row: TestRunRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            project_id: row.project_id,
            executed_at: row.executed_at,
            total_tests: count_from_storage(row.total_tests, "total_tests")?,
            passed: count_from_storage(row.passed, "passed")?,
            failed: count_from_storage(row.failed, "failed")?,
            not_run: count_from_storage(row.not_run, "not_run")?,
            critical_defects: count_from_storage(row.critical_defects, "critical_defects")?,
            test_coverage_pct: row.test_coverage_pct,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl GovernanceRepository for PostgresGovernanceRepository {
    async fn find_quality_gate(&self, project_id: Uuid) -> AppResult<Option<QualityGate>> {
        let row = sqlx::query_as::<_, QualityGateRow>(
            r#"
            SELECT project_id, min_pass_rate, max_critical_defects, min_test_coverage, updated_at
            FROM quality_gates
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find quality gate for project '{project_id}': {error}"
            ))
        })?;

        row.map(QualityGate::try_from).transpose()
    }

    async fn save_quality_gate(&self, gate: &QualityGate) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quality_gates (
                project_id,
                min_pass_rate,
                max_critical_defects,
                min_test_coverage,
                updated_at
            )
            VALUES ($1, $2, $3, $4, COALESCE($5, now()))
            ON CONFLICT (project_id) DO UPDATE
            SET
                min_pass_rate = EXCLUDED.min_pass_rate,
                max_critical_defects = EXCLUDED.max_critical_defects,
                min_test_coverage = EXCLUDED.min_test_coverage,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(gate.project_id)
        .bind(gate.min_pass_rate)
        .bind(count_for_storage(
            gate.max_critical_defects,
            "max_critical_defects",
        )?)
        .bind(gate.min_test_coverage)
        .bind(gate.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to save quality gate for project '{}': {error}",
                gate.project_id
            ))
        })?;

        Ok(())
    }

    async fn insert_approval(&self, approval: &Approval) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO release_approvals (
                id,
                project_id,
                release_version,
                status,
                comment,
                approver_name,
                gate_snapshot,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(approval.id)
        .bind(approval.project_id)
        .bind(approval.release_version.as_deref())
        .bind(approval.status.as_str())
        .bind(approval.comment.as_str())
        .bind(approval.approver_name.as_deref())
        .bind(approval.gate_snapshot.clone().map(Json))
        .bind(approval.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert approval for project '{}': {error}",
                approval.project_id
            ))
        })?;

        Ok(())
    }

    async fn list_approvals(&self, project_id: Uuid) -> AppResult<Vec<Approval>> {
        let rows = sqlx::query_as::<_, ApprovalRow>(
            r#"
            SELECT
                id,
                project_id,
                release_version,
                status,
                comment,
                approver_name,
                gate_snapshot,
                created_at
            FROM release_approvals
            WHERE project_id = $1
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list approvals for project '{project_id}': {error}"
            ))
        })?;

        rows.into_iter().map(Approval::try_from).collect()
    }

    async fn insert_test_run(&self, run: &TestRunSummary) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO test_run_summaries (
                id,
                project_id,
                executed_at,
                total_tests,
                passed,
                failed,
                not_run,
                critical_defects,
                test_coverage_pct,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(run.id)
        .bind(run.project_id)
        .bind(run.executed_at)
        .bind(count_for_storage(run.total_tests, "total_tests")?)
        .bind(count_for_storage(run.passed, "passed")?)
        .bind(count_for_storage(run.failed, "failed")?)
        .bind(count_for_storage(run.not_run, "not_run")?)
        .bind(count_for_storage(run.critical_defects, "critical_defects")?)
        .bind(run.test_coverage_pct)
        .bind(run.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert test run for project '{}': {error}",
                run.project_id
            ))
        })?;

        Ok(())
    }

    async fn list_test_runs(
        &self,
        project_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<TestRunSummary>> {
        let limit = i64::try_from(limit)
            .map_err(|error| AppError::Validation(format!("invalid test run limit: {error}")))?;
        let rows = sqlx::query_as::<_, TestRunRow>(
            r#"
            SELECT
                id,
                project_id,
                executed_at,
                total_tests,
                passed,
                failed,
                not_run,
                critical_defects,
                test_coverage_pct,
                created_at
            FROM test_run_summaries
            WHERE project_id = $1
            ORDER BY executed_at DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list test runs for project '{project_id}': {error}"
            ))
        })?;

        rows.into_iter().map(TestRunSummary::try_from).collect()
    }
}
