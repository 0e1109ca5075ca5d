//! Gerbil report worker runtime.
//!
//! Claims queued report jobs from the API's internal route, renders them and
//! stores the outcome directly in Postgres.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use gerbil_application::{ReportDataSources, ReportExecutionMode, ReportService, WorkflowHooks};
use gerbil_core::{AppError, AppResult};
use gerbil_infrastructure::{
    LoggingWorkflowNotifier, PostgresGovernanceRepository, PostgresReportJobRepository,
    PostgresTrackingRepository,
};
use reqwest::header;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const WORKER_ID_HEADER: &str = "x-gerbil-worker-id";

#[derive(Debug, Clone, PartialEq, Eq)]
struct WorkerConfig {
    database_url: String,
    api_base_url: String,
    worker_shared_secret: String,
    worker_id: String,
    claim_limit: usize,
    poll_interval_ms: u64,
    public_base_url: String,
}

#[derive(Debug, Serialize)]
struct ClaimReportJobsRequest {
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct ClaimedReportJobsResponse {
    jobs: Vec<ClaimedReportJob>,
}

#[derive(Debug, Deserialize)]
struct ClaimedReportJob {
    job_id: String,
    report_type: String,
    format: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let report_service = build_report_service(pool, config.public_base_url.as_str());
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    info!(
        worker_id = %config.worker_id,
        api_base_url = %config.api_base_url,
        claim_limit = config.claim_limit,
        poll_interval_ms = config.poll_interval_ms,
        "gerbil-worker started"
    );

    loop {
        match claim_jobs(&http_client, &config).await {
            Ok(claimed_jobs) => {
                if claimed_jobs.is_empty() {
                    tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                    continue;
                }

                info!(
                    worker_id = %config.worker_id,
                    claimed_count = claimed_jobs.len(),
                    "claimed report jobs"
                );

                for claimed_job in claimed_jobs {
                    let job_id = match Uuid::parse_str(claimed_job.job_id.as_str()) {
                        Ok(job_id) => job_id,
                        Err(error) => {
                            warn!(
                                worker_id = %config.worker_id,
                                job_id = %claimed_job.job_id,
                                error = %error,
                                "claim response carried an invalid job id"
                            );
                            continue;
                        }
                    };

                    match report_service.run_job(job_id).await {
                        Ok(job) => info!(
                            worker_id = %config.worker_id,
                            job_id = %job_id,
                            report_type = %claimed_job.report_type,
                            format = %claimed_job.format,
                            status = job.status.as_str(),
                            "report job rendered"
                        ),
                        Err(error) => warn!(
                            worker_id = %config.worker_id,
                            job_id = %job_id,
                            error = %error,
                            "report job execution failed"
                        ),
                    }
                }
            }
            Err(error) => {
                warn!(
                    worker_id = %config.worker_id,
                    error = %error,
                    "failed to claim report jobs"
                );
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
            }
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_report_service(pool: PgPool, public_base_url: &str) -> ReportService {
    let tracking = Arc::new(PostgresTrackingRepository::new(pool.clone()));
    let hooks = WorkflowHooks::new(Arc::new(LoggingWorkflowNotifier));

    ReportService::new(
        Arc::new(PostgresReportJobRepository::new(pool.clone())),
        ReportDataSources {
            projects: tracking.clone(),
            resources: tracking.clone(),
            tasks: tracking,
            governance: Arc::new(PostgresGovernanceRepository::new(pool)),
        },
        hooks,
        ReportExecutionMode::Queued,
        public_base_url,
    )
}

async fn claim_jobs(
    http_client: &reqwest::Client,
    config: &WorkerConfig,
) -> AppResult<Vec<ClaimedReportJob>> {
    let endpoint = format!("{}/api/internal/worker/reports/claim", config.api_base_url);
    let response = http_client
        .post(endpoint)
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", config.worker_shared_secret),
        )
        .header(WORKER_ID_HEADER, config.worker_id.as_str())
        .json(&ClaimReportJobsRequest {
            limit: config.claim_limit,
        })
        .send()
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to call worker claim endpoint: {error}"))
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        return Err(AppError::Internal(format!(
            "worker claim endpoint returned status {}: {body}",
            status.as_u16()
        )));
    }

    let response_body = response
        .json::<ClaimedReportJobsResponse>()
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to parse worker claim endpoint response body: {error}"
            ))
        })?;

    Ok(response_body.jobs)
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let database_url = required("DATABASE_URL")?;
        let worker_shared_secret = required("WORKER_SHARED_SECRET")?;
        let api_base_url = lookup("WORKER_API_BASE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:3001".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let worker_id = lookup("WORKER_ID")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| format!("worker-{}", std::process::id()));
        let claim_limit = parse_var(&lookup, "WORKER_CLAIM_LIMIT", 10_usize)?;
        let poll_interval_ms = parse_var(&lookup, "WORKER_POLL_INTERVAL_MS", 1500_u64)?;
        let public_base_url = lookup("PUBLIC_BASE_URL").unwrap_or_default();

        if claim_limit == 0 {
            return Err(AppError::Validation(
                "WORKER_CLAIM_LIMIT must be greater than zero".to_owned(),
            ));
        }

        if poll_interval_ms == 0 {
            return Err(AppError::Validation(
                "WORKER_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            api_base_url,
            worker_shared_secret,
            worker_id,
            claim_limit,
            poll_interval_ms,
            public_base_url,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::WorkerConfig;

    fn config(vars: &[(&str, &str)]) -> Result<WorkerConfig, gerbil_core::AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        WorkerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let loaded = config(&[
            ("DATABASE_URL", "postgres://localhost/gerbil"),
            ("WORKER_SHARED_SECRET", "s3cret"),
            ("WORKER_API_BASE_URL", "http://api:3001/"),
        ]);
        assert!(loaded.is_ok());
        if let Ok(loaded) = loaded {
            assert_eq!(loaded.api_base_url, "http://api:3001");
            assert_eq!(loaded.claim_limit, 10);
            assert_eq!(loaded.poll_interval_ms, 1500);
            assert!(loaded.worker_id.starts_with("worker-"));
        }
    }

    #[test]
    fn secret_and_positive_limits_are_required() {
        assert!(config(&[("DATABASE_URL", "postgres://localhost/gerbil")]).is_err());
        assert!(
            config(&[
                ("DATABASE_URL", "postgres://localhost/gerbil"),
                ("WORKER_SHARED_SECRET", "s3cret"),
                ("WORKER_CLAIM_LIMIT", "0"),
            ])
            .is_err()
        );
        assert!(
            config(&[
                ("DATABASE_URL", "postgres://localhost/gerbil"),
                ("WORKER_SHARED_SECRET", "s3cret"),
                ("WORKER_POLL_INTERVAL_MS", "soon"),
            ])
            .is_err()
        );
    }
}
