use serde_json::{Value, json};

use crate::error::{ContractError, ContractResult, ensure};
use crate::fixtures::ProbeContext;
use crate::options::ProbeGroup;
use crate::payload::{list_items, numbers_match, string_field, unwrap_data};
use crate::probes::expect_rejection;
use crate::runner::Runner;

const GROUP: ProbeGroup = ProbeGroup::Governance;

pub(crate) async fn run(runner: &mut Runner) {
    runner
        .case(GROUP, "quality gate values round-trip", gate_values_round_trip)
        .await;
    runner
        .case(
            GROUP,
            "gate evaluation reports pass and fail",
            gate_evaluation_reports_verdict,
        )
        .await;
    runner
        .case(
            GROUP,
            "approval and rejection both require a comment",
            approvals_require_comment,
        )
        .await;
    runner
        .case(
            GROUP,
            "submitted approval is listed for its project",
            approval_is_listed,
        )
        .await;
    runner
        .case(
            GROUP,
            "release readiness lists projects by identifier",
            release_readiness_lists_projects,
        )
        .await;
}

async fn gate_values_round_trip(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Gate Project").await?;
    let response = context
        .client
        .post(
            "/governance/gates",
            &json!({
                "project_id": project_id,
                "min_pass_rate": "80",
                "max_critical_defects": 2,
                "min_test_coverage": 65.5,
            }),
        )
        .await?;
    response.expect_status(&[200, 201])?;

    let response = context
        .client
        .get(format!("/governance/gates/{project_id}").as_str())
        .await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let gate = unwrap_data(&body);

    let expected = [
        ("min_pass_rate", 80.0),
        ("max_critical_defects", 2.0),
        ("min_test_coverage", 65.5),
    ];
    for (field, value) in expected {
        ensure(numbers_match(&gate[field], value), || {
            format!("{field} read back as {} instead of {value}", gate[field])
        })?;
    }

    Ok(())
}

async fn gate_evaluation_reports_verdict(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Evaluation Project").await?;
    let path = format!("/governance/gates/{project_id}/evaluate");

    let cases = [
        (
            json!({"pass_rate_pct": 99, "critical_defects": 0, "test_coverage_pct": 90}),
            true,
        ),
        (
            json!({"pass_rate_pct": 60, "critical_defects": 4, "test_coverage_pct": 20}),
            false,
        ),
    ];
    for (metrics, expected) in cases {
        let response = context.client.post(path.as_str(), &metrics).await?;
        response.expect_status(&[200])?;
        let body = response.json()?;
        let passed = unwrap_data(&body).get("passed").and_then(Value::as_bool);
        ensure(passed == Some(expected), || {
            format!("metrics {metrics} evaluated to {passed:?}, expected {expected}: {body}")
        })?;
    }

    Ok(())
}

async fn approvals_require_comment(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Approval Project").await?;
    for decision in ["approved", "rejected"] {
        let response = context
            .client
            .post(
                "/governance/approvals",
                &json!({
                    "project_id": project_id,
                    "status": decision,
                    "release_version": "1.0.0",
                    "approver_name": "Contract Suite",
                }),
            )
            .await?;
        let body = expect_rejection(&response)?;
        ensure(body.get("error").is_some(), || {
            format!("{decision} without comment lacks an error key: {body}")
        })?;
    }

    Ok(())
}

async fn approval_is_listed(context: &mut ProbeContext) -> ContractResult<()> {
    let (project_id, _) = context.create_project("Approval Listing Project").await?;
    let response = context
        .client
        .post(
            "/governance/approvals",
            &json!({
                "project_id": project_id,
                "status": "approved",
                "comment": "All gates green",
                "release_version": "1.0.0",
                "approver_name": "Contract Suite",
            }),
        )
        .await?;
    response.expect_status(&[200, 201])?;
    let body = response.json()?;
    ensure(string_field(&body, &["approvalId", "id"]).is_some(), || {
        format!("approval response has no approvalId or id: {body}")
    })?;
    let status = string_field(&body, &["status"]);
    ensure(status.as_deref() == Some("approved"), || {
        format!("approval status echoed as {status:?}: {body}")
    })?;

    let response = context
        .client
        .get(format!("/governance/approvals/{project_id}").as_str())
        .await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let count = list_items(&body).map_or(0, Vec::len);
    ensure(count > 0, || format!("no approvals listed for {project_id}: {body}"))
}

async fn release_readiness_lists_projects(context: &mut ProbeContext) -> ContractResult<()> {
    context.create_project("Readiness Project").await?;
    let response = context.client.get("/governance/release-readiness").await?;
    response.expect_status(&[200])?;
    let body = response.json()?;
    let Some(items) = body.as_array() else {
        return Err(ContractError::assertion(format!(
            "release readiness is not an array: {body}"
        )));
    };

    for item in items {
        ensure(
            string_field(item, &["project_id", "projectId", "id"]).is_some(),
            || format!("readiness item without a project identifier: {item}"),
        )?;
    }

    Ok(())
}
