use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gerbil_application::{ReportJobPage, ReportJobQuery, ReportJobRepository};
use gerbil_core::{AppError, AppResult};
use gerbil_domain::{ReportFormat, ReportJob, ReportStatus, ReportType};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;


const REPORT_JOB_COLUMNS: &str = r#"
    job_id,
    report_type,
    format,
    status,
    filters,
    user_email,
    download_url,
    filename,
    file_size,
    error_message,
    content,
    claimed_by,
    lease_expires_at,
    created_at,
    completed_at
"#;

/// PostgreSQL-backed report job queue.
#[derive(Clone)]
pub struct PostgresReportJobRepository {
    pool: PgPool,
}

impl PostgresReportJobRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReportJobRow {
    job_id: Uuid,
    report_type: String,
    format: String,
    status: String,
    filters: Json<Value>,
    user_email: Option<String>,
    download_url: Option<String>,
    filename: Option<String>,
    file_size: Option<i64>,
    error_message: Option<String>,
    content: Option<String>,
    claimed_by: Option<String>,
    lease_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReportJobRow> for ReportJob {
    type Error = AppError;

    fn try_from(row: ReportJobRow) -> Result<Self, Self::Error> {
        Ok(Self {
            job_id: row.job_id,
            report_type: ReportType::from_str(&row.report_type)?,
            format: ReportFormat::from_str(&row.format)?,
            status: ReportStatus::from_str(&row.status)?,
            filters: row.filters.0,
            user_email: row.user_email,
            download_url: row.download_url,
            filename: row.filename,
            file_size: row
                .file_size
                .map(|size| {
                    u64::try_from(size).map_err(|error| {
                        AppError::Internal(format!("invalid stored file_size '{size}': {error}"))
                    })
                })
                .transpose()?,
            error_message: row.error_message,
            content: row.content,
            claimed_by: row.claimed_by,
            lease_expires_at: row.lease_expires_at,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

fn file_size_for_storage(job: &ReportJob) -> AppResult<Option<i64>> {
    job.file_size
        .map(|size| {
            i64::try_from(size)
                .map_err(|error| AppError::Validation(format!("invalid report file_size: {error}")))
        })
        .transpose()
}

fn page_value(value: usize, field: &str) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|error| AppError::Validation(format!("invalid report job {field}: {error}")))
}

#[async_trait]
impl ReportJobRepository for PostgresReportJobRepository {
    async fn insert_job(&self, job: &ReportJob) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO report_jobs (
                job_id,
                report_type,
                format,
                status,
                filters,
                user_email,
                download_url,
                filename,
                file_size,
                error_message,
                content,
                claimed_by,
                lease_expires_at,
                created_at,
                completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (job_id)
            DO NOTHING
            "#,
        )
        .bind(job.job_id)
        .bind(job.report_type.as_str())
        .bind(job.format.as_str())
        .bind(job.status.as_str())
        .bind(Json(job.filters.clone()))
        .bind(job.user_email.as_deref())
        .bind(job.download_url.as_deref())
        .bind(job.filename.as_deref())
        .bind(file_size_for_storage(job)?)
        .bind(job.error_message.as_deref())
        .bind(job.content.as_deref())
        .bind(job.claimed_by.as_deref())
        .bind(job.lease_expires_at)
        .bind(job.created_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert report job '{}': {error}",
                job.job_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "report job '{}' already exists",
                job.job_id
            )));
        }

        Ok(())
    }

    async fn update_job(&self, job: &ReportJob) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE report_jobs
            SET
                status = $2,
                download_url = $3,
                filename = $4,
                file_size = $5,
                error_message = $6,
                content = $7,
                claimed_by = $8,
                lease_expires_at = $9,
                completed_at = $10
            WHERE job_id = $1
            "#,
        )
        .bind(job.job_id)
        .bind(job.status.as_str())
        .bind(job.download_url.as_deref())
        .bind(job.filename.as_deref())
        .bind(file_size_for_storage(job)?)
        .bind(job.error_message.as_deref())
        .bind(job.content.as_deref())
        .bind(job.claimed_by.as_deref())
        .bind(job.lease_expires_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update report job '{}': {error}",
                job.job_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "report job '{}' does not exist",
                job.job_id
            )));
        }

        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> AppResult<Option<ReportJob>> {
        let row = sqlx::query_as::<_, ReportJobRow>(&format!(
            "SELECT {REPORT_JOB_COLUMNS} FROM report_jobs WHERE job_id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find report job '{job_id}': {error}"))
        })?;

        row.map(ReportJob::try_from).transpose()
    }

    async fn list_jobs(&self, query: &ReportJobQuery) -> AppResult<ReportJobPage> {
        let status = query.status.map(|status| status.as_str());
        let rows = sqlx::query_as::<_, ReportJobRow>(&format!(
            r#"
            SELECT {REPORT_JOB_COLUMNS}
            FROM report_jobs
            WHERE ($1::TEXT IS NULL OR user_email = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, job_id ASC
            LIMIT $3
            OFFSET $4
            "#
        ))
        .bind(query.user_email.as_deref())
        .bind(status)
        .bind(page_value(query.limit, "limit")?)
        .bind(page_value(query.offset, "offset")?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list report jobs: {error}")))?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT count(*)
            FROM report_jobs
            WHERE ($1::TEXT IS NULL OR user_email = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(query.user_email.as_deref())
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count report jobs: {error}")))?;

        Ok(ReportJobPage {
            jobs: rows
                .into_iter()
                .map(ReportJob::try_from)
                .collect::<AppResult<Vec<_>>>()?,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn claim_jobs(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ReportJob>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start report job claim transaction: {error}"))
        })?;

        let rows = sqlx::query_as::<_, ReportJobRow>(
            r#"
            WITH candidate_jobs AS (
                SELECT job_id
                FROM report_jobs
                WHERE status = 'processing'
                  AND (lease_expires_at IS NULL OR lease_expires_at < now())
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE report_jobs jobs
            SET
                claimed_by = $2,
                lease_expires_at = now() + make_interval(secs => $3::INT)
            FROM candidate_jobs
            WHERE jobs.job_id = candidate_jobs.job_id
            RETURNING
                jobs.job_id,
                jobs.report_type,
                jobs.format,
                jobs.status,
                jobs.filters,
                jobs.user_email,
                jobs.download_url,
                jobs.filename,
                jobs.file_size,
                jobs.error_message,
                jobs.content,
                jobs.claimed_by,
                jobs.lease_expires_at,
                jobs.created_at,
                jobs.completed_at
            "#,
        )
        .bind(page_value(limit, "claim limit")?)
        .bind(worker_id)
        .bind(i32::try_from(lease_seconds).map_err(|error| {
            AppError::Validation(format!("invalid report lease_seconds: {error}"))
        })?)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to claim report jobs for worker '{worker_id}': {error}"
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit report job claim transaction: {error}"))
        })?;

        let mut jobs = rows
            .into_iter()
            .map(ReportJob::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        jobs.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        Ok(jobs)
    }
}
