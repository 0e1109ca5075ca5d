use gerbil_core::AppError;
use gerbil_domain::{ReportFormat, ReportRequest, ReportStatus, ReportType};
use serde_json::{Value, json};

use super::{ReportCallback, ReportExecutionMode};
use crate::report_ports::ReportJobQuery;
use crate::test_support::Harness;

fn request(report_type: ReportType, format: ReportFormat) -> ReportRequest {
    ReportRequest {
        report_type,
        format: Some(format),
        filters: None,
        user_email: Some("qa@gerbil.qc".to_owned()),
    }
}

#[tokio::test]
async fn inline_jobs_complete_after_submission() {
    let harness = Harness::default();
    harness.project("PRJ-R1").await;
    let service = harness.report_service(ReportExecutionMode::Inline);

    let submitted = service
        .submit(request(ReportType::ProjectStatus, ReportFormat::Json))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(submitted.status, ReportStatus::Processing);

    let job = service
        .get_job(submitted.job_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(job.status, ReportStatus::Completed);
    assert!(
        job.download_url
            .as_deref()
            .unwrap_or_default()
            .ends_with("/download")
    );

    let download = service
        .download(job.job_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    let body: Value = serde_json::from_str(&download.content).unwrap_or_default();
    assert_eq!(body["row_count"], json!(1));
    assert_eq!(body["rows"][0]["project_id"], json!("PRJ-R1"));
    assert_eq!(harness.notifier.kinds().await.last(), Some(&"report-generate"));
}

#[tokio::test]
async fn csv_export_has_header_and_rows() {
    let harness = Harness::default();
    let project = harness.project("PRJ-R2").await;
    assert!(
        harness
            .task_service()
            .create_task(&Harness::actor(), Harness::task_input("TSK-CSV", project.id))
            .await
            .is_ok()
    );
    let service = harness.report_service(ReportExecutionMode::Inline);

    let job = service
        .submit(request(ReportType::TaskExport, ReportFormat::Csv))
        .await
        .unwrap_or_else(|_| unreachable!());
    let download = service
        .download(job.job_id)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(download.content_type, "text/csv; charset=utf-8");
    let lines: Vec<&str> = download.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,task_id,project_id"));
    assert!(lines[1].contains("TSK-CSV"));
}

#[tokio::test]
async fn external_formats_fail_with_reason() {
    let harness = Harness::default();
    let service = harness.report_service(ReportExecutionMode::Inline);

    let job = service
        .submit(request(ReportType::Dashboard, ReportFormat::Pdf))
        .await
        .unwrap_or_else(|_| unreachable!());
    let stored = service
        .get_job(job.job_id)
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(stored.status, ReportStatus::Failed);
    assert!(
        stored
            .error_message
            .as_deref()
            .unwrap_or_default()
            .contains("pdf")
    );
    assert!(matches!(
        service.download(job.job_id).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn invalid_filters_fail_the_job() {
    let harness = Harness::default();
    let service = harness.report_service(ReportExecutionMode::Inline);

    let job = service
        .submit(ReportRequest {
            filters: Some(json!({"project_id": "not-a-uuid"})),
            ..request(ReportType::TaskExport, ReportFormat::Json)
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    let stored = service
        .get_job(job.job_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.status, ReportStatus::Failed);
}

#[tokio::test]
async fn queued_jobs_wait_for_a_worker() {
    let harness = Harness::default();
    let service = harness.report_service(ReportExecutionMode::Queued);

    let job = service
        .submit(request(ReportType::Dashboard, ReportFormat::Json))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(matches!(
        service.download(job.job_id).await,
        Err(AppError::Conflict(_))
    ));

    let claimed = service
        .claim_jobs("worker-1", 10)
        .await
        .unwrap_or_default();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].claimed_by.as_deref(), Some("worker-1"));
    assert!(
        service
            .claim_jobs("worker-2", 10)
            .await
            .unwrap_or_default()
            .is_empty()
    );

    let done = service
        .run_job(job.job_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(done.status, ReportStatus::Completed);
    assert!(done.claimed_by.is_none());
}

#[tokio::test]
async fn callbacks_finish_jobs_once() {
    let harness = Harness::default();
    let service = harness.report_service(ReportExecutionMode::Queued);
    let job = service
        .submit(request(ReportType::ResourceUtilization, ReportFormat::Xlsx))
        .await
        .unwrap_or_else(|_| unreachable!());

    let completed = service
        .apply_callback(ReportCallback {
            job_id: job.job_id,
            status: ReportStatus::Completed,
            download_url: Some("https://files.gerbil.qc/report.xlsx".to_owned()),
            filename: Some("report.xlsx".to_owned()),
            file_size: Some(2048),
            error_message: None,
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(completed.status, ReportStatus::Completed);
    assert_eq!(completed.file_size, Some(2048));

    let late = service
        .apply_callback(ReportCallback {
            job_id: job.job_id,
            status: ReportStatus::Failed,
            download_url: None,
            filename: None,
            file_size: None,
            error_message: Some("renderer crashed".to_owned()),
        })
        .await;
    assert!(matches!(late, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn listing_pages_and_filters() {
    let harness = Harness::default();
    let service = harness.report_service(ReportExecutionMode::Queued);
    for _ in 0..3 {
        assert!(
            service
                .submit(request(ReportType::Dashboard, ReportFormat::Json))
                .await
                .is_ok()
        );
    }

    let page = service
        .list_jobs(ReportJobQuery {
            limit: 2,
            ..ReportJobQuery::default()
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(page.total, 3);
    assert_eq!(page.jobs.len(), 2);

    let completed = service
        .list_jobs(ReportJobQuery {
            status: Some(ReportStatus::Completed),
            ..ReportJobQuery::default()
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(completed.total, 0);
}
