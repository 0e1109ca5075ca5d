use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gerbil_application::{ReportJobPage, ReportJobQuery, ReportJobRepository};
use gerbil_core::{AppError, AppResult};
use gerbil_domain::{ReportJob, ReportStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory report job repository with lease-based claiming.
#[derive(Debug, Default)]
pub struct InMemoryReportJobRepository {
    jobs: RwLock<HashMap<Uuid, ReportJob>>,
}

impl InMemoryReportJobRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(left: &ReportJob, right: &ReportJob) -> std::cmp::Ordering {
    right
        .created_at
        .cmp(&left.created_at)
        .then_with(|| left.job_id.cmp(&right.job_id))
}

#[async_trait]
impl ReportJobRepository for InMemoryReportJobRepository {
    async fn insert_job(&self, job: &ReportJob) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.job_id) {
            return Err(AppError::Conflict(format!(
                "report job '{}' already exists",
                job.job_id
            )));
        }

        jobs.insert(job.job_id, job.clone());
        Ok(())
    }

    async fn update_job(&self, job: &ReportJob) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;
        let Some(stored) = jobs.get_mut(&job.job_id) else {
            return Err(AppError::NotFound(format!(
                "report job '{}' does not exist",
                job.job_id
            )));
        };

        *stored = job.clone();
        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> AppResult<Option<ReportJob>> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }

    async fn list_jobs(&self, query: &ReportJobQuery) -> AppResult<ReportJobPage> {
        let jobs = self.jobs.read().await;
        let mut matching: Vec<&ReportJob> = jobs.values().filter(|job| query.matches(job)).collect();
        matching.sort_by(|left, right| newest_first(left, right));

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
        let lease_expires_at = now + Duration::seconds(i64::from(lease_seconds));
        let mut jobs = self.jobs.write().await;

        let mut candidates: Vec<&mut ReportJob> = jobs
            .values_mut()
            .filter(|job| {
                job.status == ReportStatus::Processing
                    && job.lease_expires_at.is_none_or(|expiry| expiry < now)
            })
            .collect();
        candidates.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.job_id.cmp(&right.job_id))
        });

        Ok(candidates
            .into_iter()
            .take(limit)
            .map(|job| {
                job.claimed_by = Some(worker_id.to_owned());
                job.lease_expires_at = Some(lease_expires_at);
                job.clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use gerbil_application::{ReportJobQuery, ReportJobRepository};
    use gerbil_domain::{ReportJob, ReportOutcome, ReportRequest, ReportStatus, ReportType};

    use super::InMemoryReportJobRepository;

    fn job(user_email: &str) -> ReportJob {
        ReportJob::new(
            ReportRequest {
                report_type: ReportType::Dashboard,
                format: None,
                filters: None,
                user_email: Some(user_email.to_owned()),
            },
            Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn claims_skip_leased_and_finished_jobs() {
        let repository = InMemoryReportJobRepository::new();
        let open = job("a@gerbil.qc");
        let mut finished = job("a@gerbil.qc");
        assert!(
            finished
                .complete(ReportOutcome::default(), Utc::now())
                .is_ok()
        );
        assert!(repository.insert_job(&open).await.is_ok());
        assert!(repository.insert_job(&finished).await.is_ok());

        let first = repository.claim_jobs("w1", 5, 60).await.unwrap_or_default();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].job_id, open.job_id);
        assert!(
            repository
                .claim_jobs("w2", 5, 60)
                .await
                .unwrap_or_default()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn expired_leases_can_be_reclaimed() {
        let repository = InMemoryReportJobRepository::new();
        let mut stale = job("b@gerbil.qc");
        stale.claimed_by = Some("crashed".to_owned());
        stale.lease_expires_at = Some(Utc::now() - Duration::seconds(5));
        assert!(repository.insert_job(&stale).await.is_ok());

        let claimed = repository.claim_jobs("w1", 1, 60).await.unwrap_or_default();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].claimed_by.as_deref(), Some("w1"));
    }

    #[tokio::test]
    async fn listing_filters_by_user_and_status() {
        let repository = InMemoryReportJobRepository::new();
        for email in ["c@gerbil.qc", "c@gerbil.qc", "d@gerbil.qc"] {
            assert!(repository.insert_job(&job(email)).await.is_ok());
        }

        let page = repository
            .list_jobs(&ReportJobQuery {
                user_email: Some("c@gerbil.qc".to_owned()),
                status: Some(ReportStatus::Processing),
                limit: 1,
                offset: 0,
            })
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(page.total, 2);
        assert_eq!(page.jobs.len(), 1);
    }
}
