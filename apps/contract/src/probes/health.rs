use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;

use crate::error::{ContractResult, ensure};
use crate::fixtures::ProbeContext;
use crate::options::ProbeGroup;
use crate::payload::{as_number, unwrap_data};
use crate::runner::Runner;

const DASHBOARD_BUDGET: Duration = Duration::from_secs(3);

const LIVENESS_KEYS: [&str; 4] = ["status", "health", "uptime", "message"];

const DASHBOARD_KEYS: [&str; 6] = [
    "total_tasks",
    "tasks_done",
    "tasks_in_progress",
    "total_projects",
    "active_resources",
    "tasks_backlog",
];

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(ProbeGroup::Health, "health endpoint reports liveness", health_reports_liveness)
        .await;
    runner
        .case(
            ProbeGroup::Health,
            "dashboard metrics load quickly and are non-negative",
            dashboard_metrics_are_non_negative,
        )
        .await;
}

async fn health_reports_liveness(context: &mut ProbeContext) -> ContractResult<()> {
    let response = context.client.send(Method::GET, "/health", None).await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    ensure(body.is_object(), || format!("/health is not a JSON object: {body}"))?;
    ensure(LIVENESS_KEYS.iter().any(|key| body.get(*key).is_some()), || {
        format!("/health carries none of {LIVENESS_KEYS:?}: {body}")
    })
}

async fn dashboard_metrics_are_non_negative(context: &mut ProbeContext) -> ContractResult<()> {
    let started = Instant::now();
    let response = context.client.get("/dashboard").await?;
    let elapsed = started.elapsed();
    response.expect_status(&[200])?;
    ensure(elapsed <= DASHBOARD_BUDGET, || {
        format!("dashboard took {} ms", elapsed.as_millis())
    })?;

    let body = response.json()?;
    let metrics = unwrap_data(&body);
    ensure(metrics.is_object(), || format!("dashboard is not a JSON object: {body}"))?;

    let present: Vec<(&str, &Value)> = DASHBOARD_KEYS
        .iter()
        .filter_map(|key| metrics.get(*key).map(|value| (*key, value)))
        .collect();
    ensure(!present.is_empty(), || {
        format!("dashboard carries none of {DASHBOARD_KEYS:?}: {body}")
    })?;

    for (key, value) in present {
        if let Some(number) = as_number(value) {
            ensure(number >= 0.0, || format!("dashboard {key} is negative: {number}"))?;
        }
    }

    Ok(())
}
