use serde_json::{Value, json};

use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::{FixtureKind, ProbeContext, task_code};
use crate::options::ProbeGroup;
use crate::payload::{list_items, marks_deleted, string_field, unwrap_data};
use crate::probes::expect_rejection;
use crate::runner::Runner;

const GROUP: ProbeGroup = ProbeGroup::Tasks;

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(GROUP, "new task starts in Backlog", new_task_starts_in_backlog)
        .await;
    runner
        .case(
            GROUP,
            "task requires task_id, project_id and task_name",
            required_fields_are_enforced,
        )
        .await;
    runner
        .case(
            GROUP,
            "status moves forward and never back",
            status_moves_forward_only,
        )
        .await;
    runner
        .case(
            GROUP,
            "Done requires a completion date and actual hours",
            done_requires_evidence,
        )
        .await;
    runner
        .case(
            GROUP,
            "resource linkage survives status transitions",
            resource_link_survives_transitions,
        )
        .await;
    runner
        .case(GROUP, "created task is listed", created_task_is_listed)
        .await;
    runner
        .case(GROUP, "deleted task is gone or soft-deleted", delete_is_soft)
        .await;
}

async fn patch_task(context: &ProbeContext, id: &str, body: Value) -> ContractResult<Value> {
    let response = context
        .client
        .patch(format!("/tasks/{id}").as_str(), &body)
        .await?;
    response.expect_status(&[200])?;
    response.json()
}

async fn persisted_status(context: &ProbeContext, id: &str) -> ContractResult<String> {
    let response = context.client.get(format!("/tasks/{id}").as_str()).await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    string_field(&body, &["status"])
        .ok_or_else(|| ContractError::assertion(format!("task has no status: {body}")))
}

async fn new_task_starts_in_backlog(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Task Project").await?;
    let (_, body) = context.create_task(project_id.as_str(), json!({})).await?;
    let status = string_field(&body, &["status"]);
    ensure(status.as_deref() == Some("Backlog"), || {
        format!("new task status is {status:?}: {body}")
    })
}

async fn required_fields_are_enforced(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Task Validation Project").await?;
    let task_id = task_code();
    let payloads = [
        (
            "missing task_id",
            json!({"project_id": project_id, "task_name": "No Code"}),
        ),
        (
            "missing project_id",
            json!({"task_id": task_id, "task_name": "Orphan"}),
        ),
        (
            "missing task_name",
            json!({"task_id": task_id, "project_id": project_id}),
        ),
    ];

    for (label, payload) in payloads {
        let response = context.client.post("/tasks", &payload).await?;
        if matches!(response.status, 200 | 201)
            && let Some(id) = response.json().ok().and_then(|body| string_field(&body, &["id"]))
        {
            context.fixtures.track(FixtureKind::Task, id.as_str());
        }
        expect_rejection(&response)
            .map_err(|error| ContractError::assertion(format!("{label}: {error}")))?;
    }

    Ok(())
}

async fn status_moves_forward_only(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("State Machine Project").await?;
    let (id, _) = context
        .create_task(project_id.as_str(), json!({"status": "Backlog"}))
        .await?;

    patch_task(context, id.as_str(), json!({"status": "In Progress"})).await?;
    patch_task(
        context,
        id.as_str(),
        json!({"status": "Done", "completed_date": "2026-01-31", "r1_actual_hrs": 8}),
    )
    .await?;

    let response = context
        .client
        .patch(format!("/tasks/{id}").as_str(), &json!({"status": "Backlog"}))
        .await?;
    expect_rejection(&response)?;

    let status = persisted_status(context, id.as_str()).await?;
    ensure(status == "Done", || {
        format!("rejected transition changed the status to {status}")
    })
}

async fn done_requires_evidence(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Evidence Project").await?;
    let (id, _) = context
        .create_task(project_id.as_str(), json!({"status": "In Progress"}))
        .await?;

    let response = context
        .client
        .patch(format!("/tasks/{id}").as_str(), &json!({"status": "Done"}))
        .await?;
    expect_rejection(&response)?;

    let status = persisted_status(context, id.as_str()).await?;
    ensure(status == "In Progress", || {
        format!("rejected completion changed the status to {status}")
    })
}

async fn resource_link_survives_transitions(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Linkage Project").await?;
    let (resource_id, _) = context.create_resource(40).await?;
    let (id, _) = context
        .create_task(
            project_id.as_str(),
            json!({"resource1_uuid": resource_id, "r1_estimate_hrs": 6}),
        )
        .await?;

    let steps = [
        json!({"status": "In Progress"}),
        json!({"status": "Done", "completed_date": "2026-01-31", "r1_actual_hrs": 5}),
    ];
    for step in steps {
        let body = patch_task(context, id.as_str(), step).await?;
        let linked = string_field(&body, &["resource1_uuid"]);
        ensure(linked.as_deref() == Some(resource_id.as_str()), || {
            format!("resource1_uuid drifted to {linked:?}: {body}")
        })?;
    }

    Ok(())
}

async fn created_task_is_listed(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Listing Project").await?;
    let (id, _) = context.create_task(project_id.as_str(), json!({})).await?;

    let response = context
        .client
        .get(format!("/tasks?project_id={project_id}").as_str())
        .await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let listed = list_items(&body).is_some_and(|items| {
        items
            .iter()
            .any(|item| item.get("id").and_then(Value::as_str) == Some(id.as_str()))
    });
    ensure(listed, || format!("task {id} missing from listing: {body}"))
}

async fn delete_is_soft(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Deletion Project").await?;
    let (id, _) = context.create_task(project_id.as_str(), json!({})).await?;
    let path = format!("/tasks/{id}");
    let response = context.client.delete(path.as_str()).await?;
    response.expect_status(&[200, 204])?;
    context.fixtures.release(FixtureKind::Task, id.as_str());

    let response = context.client.get(path.as_str()).await?;
    match response.status {
        404 => Ok(()),
        200 => {
            let body = response.json()?;
            ensure(marks_deleted(unwrap_data(&body)), || {
                format!("deleted task is readable without deleted_at: {body}")
            })
        }
        status => Err(ContractError::assertion(format!(
            "GET after delete returned {status}"
        ))),
    }
}
