use serde_json::json;

use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::{FixtureKind, ProbeContext};
use crate::options::ProbeGroup;
use crate::payload::{marks_deleted, numbers_match, string_field, unwrap_data};
use crate::probes::expect_rejection;
use crate::runner::Runner;

const GROUP: ProbeGroup = ProbeGroup::Resources;

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(GROUP, "resource create echoes name and capacity", create_echoes_fields)
        .await;
    runner
        .case(
            GROUP,
            "weekly capacity of 80 is accepted and 100 rejected",
            capacity_boundary,
        )
        .await;
    runner
        .case(
            GROUP,
            "assigned resource exposes its allocation",
            allocation_is_exposed,
        )
        .await;
    runner
        .case(GROUP, "deleted resource is gone or soft-deleted", delete_is_soft)
        .await;
}

async fn create_echoes_fields(context: &mut ProbeContext) -> ContractResult<()> {
    let (_, body) = context.create_resource(40).await?;
    ensure(string_field(&body, &["resource_name"]).is_some(), || {
        format!("resource_name not echoed: {body}")
    })?;
    ensure(numbers_match(&unwrap_data(&body)["weekly_capacity_hrs"], 40.0), || {
        format!("weekly_capacity_hrs not echoed: {body}")
    })
}

async fn capacity_boundary(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_resource(80).await?;
    let path = format!("/resources/{id}");

    let response = context
        .client
        .patch(path.as_str(), &json!({"weekly_capacity_hrs": 100}))
        .await?;
    expect_rejection(&response)?;

    let response = context
        .client
        .patch(path.as_str(), &json!({"weekly_capacity_hrs": 80}))
        .await?;
    response.expect_status(&[200])?;

    let response = context.client.get(path.as_str()).await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    ensure(numbers_match(&unwrap_data(&body)["weekly_capacity_hrs"], 80.0), || {
        format!("rejected capacity leaked into the resource: {body}")
    })
}

async fn allocation_is_exposed(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Allocation Project").await?;
    let (resource_id, _) = context.create_resource(40).await?;
    context
        .create_task(
            project_id.as_str(),
            json!({"resource1_uuid": resource_id, "r1_estimate_hrs": 12}),
        )
        .await?;

    let response = context.client.get(format!("/resources/{resource_id}").as_str()).await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let data = unwrap_data(&body);
    ensure(
        data.get("utilization_pct").is_some() || data.get("current_allocation_hrs").is_some(),
        || format!("resource exposes neither utilization_pct nor current_allocation_hrs: {body}"),
    )
}

async fn delete_is_soft(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_resource(20).await?;
    let path = format!("/resources/{id}");
    let response = context.client.delete(path.as_str()).await?;
    response.expect_status(&[200, 204])?;
    context.fixtures.release(FixtureKind::Resource, id.as_str());

    let response = context.client.get(path.as_str()).await?;
    match response.status {
        404 => Ok(()),
        200 => {
            let body = response.json()?;
            ensure(marks_deleted(&body), || {
                format!("deleted resource is readable without deleted_at: {body}")
            })
        }
        status => Err(ContractError::assertion(format!(
            "GET after delete returned {status}"
        ))),
    }
}
