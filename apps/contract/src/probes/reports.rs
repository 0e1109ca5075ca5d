use std::time::Instant;

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::ProbeContext;
use crate::options::ProbeGroup;
use crate::payload::{require_string, string_field};
use crate::runner::Runner;

const GROUP: ProbeGroup = ProbeGroup::Reports;

const COMPLETED: [&str; 3] = ["completed", "done", "ready"];
const FAILED: [&str; 2] = ["failed", "error"];

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(
            GROUP,
            "report job is accepted and polled to a terminal state",
            report_job_is_polled,
        )
        .await;
    runner
        .case(GROUP, "report listing includes submitted jobs", listing_includes_job)
        .await;
}

async fn submit_report(context: &ProbeContext) -> ContractResult<String> {
    let response = context
        .client
        .post(
            "/reports",
            &json!({"report_type": "project_status", "format": "json"}),
        )
        .await?;
    response.expect_status(&[200, 201, 202])?;
    let body = response.json()?;
    require_string(&body, &["job_id", "reportId", "id"], "report submission")
}

/// Terminal status of the job, or `None` when the poll window closed first.
async fn poll_job(context: &ProbeContext, job_id: &str) -> ContractResult<Option<String>> {
    let path = format!("/reports/{job_id}");
    let deadline = Instant::now() + context.options.report_poll_window();
    let mut last_status = String::new();

    loop {
        let response = context.client.get(path.as_str()).await?;
        response.expect_status(&[200])?;
        let body = response.json()?;
        last_status = top_level_status(&body).unwrap_or(last_status).to_lowercase();

        if COMPLETED.contains(&last_status.as_str()) || FAILED.contains(&last_status.as_str()) {
            return Ok(Some(last_status));
        }

        if Instant::now() >= deadline {
            warn!(job_id, last_status = %last_status, "report polling timed out");
            return Ok(None);
        }

        tokio::time::sleep(context.options.report_poll_interval()).await;
    }
}

fn top_level_status(body: &Value) -> Option<String> {
    body.get("status")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .or_else(|| string_field(body, &["status"]))
}

async fn report_job_is_polled(context: &mut ProbeContext) -> ContractResult<()> {
    let job_id = submit_report(context).await?;
    match poll_job(context, job_id.as_str()).await? {
        Some(status) if FAILED.contains(&status.as_str()) => {
            warn!(job_id = %job_id, status = %status, "report job ended in failure");
        }
        Some(status) => info!(job_id = %job_id, status = %status, "report job finished"),
        None => {}
    }

    Ok(())
}

async fn listing_includes_job(context: &mut ProbeContext) -> ContractResult<()> {
    let job_id = submit_report(context).await?;
    let response = context.client.get("/reports").await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    ensure(body.is_array() || body.is_object(), || {
        format!("report listing is neither a list nor an object: {body}")
    })?;

    if !response.text().contains(job_id.as_str()) {
        return Err(ContractError::assertion(format!(
            "submitted job {job_id} is missing from the listing"
        )));
    }

    Ok(())
}
