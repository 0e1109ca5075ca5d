use serde_json::json;

use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::{FixtureKind, ProbeContext, unique_suffix};
use crate::options::ProbeGroup;
use crate::payload::{marks_deleted, string_field, unwrap_data};
use crate::probes::expect_rejection;
use crate::runner::Runner;

const GROUP: ProbeGroup = ProbeGroup::Projects;

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(GROUP, "valid project is created with an id", valid_project_is_created)
        .await;
    runner
        .case(
            GROUP,
            "project patch echoes the new name and rejects an unknown priority",
            patch_echoes_and_rejects_priority,
        )
        .await;
    runner
        .case(GROUP, "invalid project payloads are rejected", invalid_payloads_are_rejected)
        .await;
    runner
        .case(GROUP, "created project is listed exactly once", created_project_is_listed_once)
        .await;
    runner
        .case(GROUP, "repeated reads are byte-identical", repeated_reads_are_identical)
        .await;
    runner
        .case(GROUP, "deleted project is gone or soft-deleted", delete_is_soft)
        .await;
}

async fn valid_project_is_created(context: &mut ProbeContext) -> ContractResult<()> {
    let (_, body) = context.create_project("Test Project Valid").await?;
    let echoed = string_field(&body, &["name", "project_name"]);
    ensure(echoed.as_deref() == Some("Test Project Valid"), || {
        format!("project name not echoed: {body}")
    })
}

async fn patch_echoes_and_rejects_priority(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_project("Test Project Valid").await?;
    let path = format!("/projects/{id}");

    let response = context
        .client
        .patch(path.as_str(), &json!({"name": "Updated Project Name"}))
        .await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let echoed = string_field(&body, &["name", "project_name"]);
    ensure(echoed.as_deref() == Some("Updated Project Name"), || {
        format!("patched name not echoed: {body}")
    })?;

    let response = context
        .client
        .patch(path.as_str(), &json!({"priority": "InvalidPriority"}))
        .await?;
    expect_rejection(&response)?;
    Ok(())
}

async fn invalid_payloads_are_rejected(context: &mut ProbeContext) -> ContractResult<()> {
    let code = || format!("PROJ-TEST-{}", unique_suffix());
    let payloads = [
        ("missing project_id", json!({"name": "No Code"})),
        ("empty name", json!({"project_id": code(), "name": ""})),
        (
            "unknown priority",
            json!({"project_id": code(), "name": "Bad Priority", "priority": "Urgent"}),
        ),
        (
            "total_weight out of range",
            json!({"project_id": code(), "name": "Heavy", "total_weight": 101}),
        ),
    ];

    for (label, payload) in payloads {
        let response = context.client.post("/projects", &payload).await?;
        if matches!(response.status, 200 | 201)
            && let Some(id) = response.json().ok().and_then(|body| string_field(&body, &["id"]))
        {
            context.fixtures.track(FixtureKind::Project, id.as_str());
        }
        ensure(matches!(response.status, 400 | 422 | 500), || {
            format!("{label}: expected a rejection, got {}", response.status)
        })?;
        if response.status != 500 {
            expect_rejection(&response)?;
        }
    }

    Ok(())
}

async fn created_project_is_listed_once(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_project("Listed Project").await?;
    let response = context.client.get("/projects").await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let Some(items) = body.as_array() else {
        return Err(ContractError::assertion(format!(
            "project list is not an array: {body}"
        )));
    };

    let occurrences = items
        .iter()
        .filter(|item| item.get("id").and_then(|value| value.as_str()) == Some(id.as_str()))
        .count();
    ensure(occurrences == 1, || {
        format!("project {id} listed {occurrences} times")
    })
}

async fn repeated_reads_are_identical(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_project("Stable Project").await?;
    let path = format!("/projects/{id}");
    let first = context.client.get(path.as_str()).await?;
    first.expect_status(&[200])?;
    let second = context.client.get(path.as_str()).await?;
    second.expect_status(&[200])?;
    ensure(first.body == second.body, || {
        format!("{path} changed between reads: {} vs {}", first.text(), second.text())
    })
}

async fn delete_is_soft(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_project("Doomed Project").await?;
    let path = format!("/projects/{id}");
    let response = context.client.delete(path.as_str()).await?;
    response.expect_status(&[200, 204])?;
    context.fixtures.release(FixtureKind::Project, id.as_str());

    let response = context.client.get(path.as_str()).await?;
    match response.status {
        404 => Ok(()),
        200 => {
            let body = response.json()?;
            ensure(marks_deleted(unwrap_data(&body)), || {
                format!("deleted project is readable without deleted_at: {body}")
            })
        }
        status => Err(ContractError::assertion(format!(
            "GET after delete returned {status}"
        ))),
    }
}
