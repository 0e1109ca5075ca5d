use serde_json::{Value, json};

use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::{FixtureKind, ProbeContext};
use crate::options::ProbeGroup;
use crate::payload::{list_items, marks_deleted};
use crate::runner::Runner;

const GROUP: ProbeGroup = ProbeGroup::Audit;

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(
            GROUP,
            "project writes leave before and after snapshots",
            project_writes_are_audited,
        )
        .await;
    runner
        .case(
            GROUP,
            "resource writes leave before and after snapshots",
            resource_writes_are_audited,
        )
        .await;
    runner
        .case(
            GROUP,
            "task writes leave before and after snapshots",
            task_writes_are_audited,
        )
        .await;
}

/// Entries for one entity, trying both audit route shapes.
async fn audit_entries(
    context: &ProbeContext,
    entity: &str,
    id: &str,
) -> ContractResult<Vec<Value>> {
    let candidates = [
        format!("/audit-logs?entity={entity}&id={id}"),
        format!("/audit/logs?entity={entity}&entityId={id}"),
    ];

    let mut last_status = 0;
    for path in candidates {
        let response = context.client.get(path.as_str()).await?;
        if response.status == 200 {
            let body = response.json()?;
            return list_items(&body).cloned().ok_or_else(|| {
                ContractError::assertion(format!("{path} did not return a list: {body}"))
            });
        }
        last_status = response.status;
    }

    Err(ContractError::assertion(format!(
        "no audit route answered for {entity} {id}, last status {last_status}"
    )))
}

fn entry_action(entry: &Value) -> String {
    entry
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_uppercase()
}

fn has_snapshot(entry: &Value, key: &str) -> bool {
    entry.get(key).is_some_and(Value::is_object)
}

/// Checks create, update and delete entries of one entity after the three writes.
async fn verify_trail(
    context: &mut ProbeContext,
    kind: FixtureKind,
    entity: &str,
    id: &str,
    patch: Value,
) -> ContractResult<()> {
    let path = format!("{}/{id}", kind.collection());
    context
        .client
        .patch(path.as_str(), &patch)
        .await?
        .expect_status(&[200])?;
    context
        .client
        .delete(path.as_str())
        .await?
        .expect_status(&[200, 204])?;
    context.fixtures.release(kind, id);

    let entries = audit_entries(context, entity, id).await?;
    let find = |action: &str| entries.iter().find(|entry| entry_action(entry) == action);

    let created = find("CREATE");
    ensure(created.is_some_and(|entry| has_snapshot(entry, "after")), || {
        format!("{entity} {id} has no create entry with an after snapshot: {entries:?}")
    })?;

    let updated = find("UPDATE");
    ensure(
        updated.is_some_and(|entry| has_snapshot(entry, "before") && has_snapshot(entry, "after")),
        || format!("{entity} {id} has no update entry with both snapshots: {entries:?}"),
    )?;

    let deleted = find("DELETE");
    ensure(
        deleted.is_some_and(|entry| {
            has_snapshot(entry, "before") && entry.get("after").is_some_and(marks_deleted)
        }),
        || format!("{entity} {id} delete entry does not mark a deletion: {entries:?}"),
    )
}

async fn project_writes_are_audited(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_project("Audit Test Project").await?;
    verify_trail(
        context,
        FixtureKind::Project,
        "projects",
        id.as_str(),
        json!({"description": "Audited change"}),
    )
    .await
}

async fn resource_writes_are_audited(context: &mut ProbeContext) -> ContractResult<()> {
    let (id, _) = context.create_resource(30).await?;
    verify_trail(
        context,
        FixtureKind::Resource,
        "resources",
        id.as_str(),
        json!({"weekly_capacity_hrs": 35}),
    )
    .await
}

async fn task_writes_are_audited(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Audit Task Project").await?;
    let (id, _) = context.create_task(project_id.as_str(), json!({})).await?;
    verify_trail(
        context,
        FixtureKind::Task,
        "tasks",
        id.as_str(),
        json!({"status": "In Progress"}),
    )
    .await
}
