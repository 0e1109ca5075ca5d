use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use gerbil_application::ReportExecutionMode;
use http_body_util::BodyExt;
use proptest::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use super::build_router;
use crate::api_config::ApiConfig;
use crate::api_services::build_memory_state;
use crate::extract::ACTOR_HEADER;
use crate::middleware::WORKER_ID_HEADER;

const STATUSES: [&str; 4] = ["Backlog", "In Progress", "Done", "Cancelled"];

fn test_app_with(config: ApiConfig) -> Router {
    let state = build_memory_state(&config);
    assert!(state.is_ok(), "state should build");
    let Ok(state) = state else {
        return Router::new();
    };

    build_router(state, &config.frontend_url).unwrap_or_default()
}

fn test_app() -> Router {
    test_app_with(ApiConfig::in_memory())
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned);
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes().to_vec())
        .unwrap_or_default();

    (status, bytes, content_type)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(ACTOR_HEADER, "tester@example.com")
        .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
        .unwrap_or_default();

    let (status, bytes, _) = send_raw(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_owned()
}

async fn create_project(app: &Router) -> String {
    let code = format!("PRJ-{}", &Uuid::new_v4().simple().to_string()[..8]);
    let (status, body) = send(
        app,
        Method::POST,
        "/api/projects",
        Some(json!({"project_id": code, "name": "Apollo", "priority": "High"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

async fn create_resource(app: &Router, capacity: u32) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/resources",
        Some(json!({"resource_name": "Ada", "weekly_capacity_hrs": capacity})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

async fn create_task(app: &Router, project_id: &str, extra: Value) -> (StatusCode, Value) {
    let mut payload = json!({
        "task_id": format!("TSK-{}", Uuid::new_v4().simple().to_string()[..8].to_uppercase()),
        "project_id": project_id,
        "task_name": "Write the release plan",
    });
    if let (Some(payload), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        payload.extend(extra.clone());
    }
    send(app, Method::POST, "/api/tasks", Some(payload)).await
}

/// Status patch; moves to Done also carry the completion evidence.
fn transition_patch(status: &str) -> Value {
    if status == "Done" {
        json!({"status": status, "completed_date": "2026-01-15", "r1_actual_hrs": 4})
    } else {
        json!({"status": status})
    }
}

async fn task_in_status(app: &Router, project_id: &str, status: &str) -> String {
    let (_, task) = create_task(app, project_id, json!({})).await;
    let task_id = id_of(&task);
    let path: &[&str] = match status {
        "In Progress" => &["In Progress"],
        "Done" => &["In Progress", "Done"],
        "Cancelled" => &["Cancelled"],
        _ => &[],
    };
    for step in path {
        let (code, body) = send(
            app,
            Method::PATCH,
            &format!("/api/tasks/{task_id}"),
            Some(transition_patch(step)),
        )
        .await;
        assert_eq!(code, StatusCode::OK, "{body}");
    }
    task_id
}

#[tokio::test]
async fn health_answers_on_both_prefixes() {
    let app = test_app();
    for uri in ["/health", "/api/health"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
    }
}

#[tokio::test]
async fn project_lifecycle_round_trip() {
    let app = test_app();
    let project_id = create_project(&app).await;

    let (status, list) = send(&app, Method::GET, "/projects", None).await;
    assert_eq!(status, StatusCode::OK);
    let occurrences = list
        .as_array()
        .map(|projects| projects.iter().filter(|p| p["id"] == project_id.as_str()).count())
        .unwrap_or_default();
    assert_eq!(occurrences, 1);

    let (status, first) = send(&app, Method::GET, &format!("/api/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["name"], "Apollo");
    assert_eq!(first["project_name"], "Apollo");
    let (_, second) = send(&app, Method::GET, &format!("/api/projects/{project_id}"), None).await;
    assert_eq!(first, second);

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/projects/{project_id}"),
        Some(json!({"priority": "Low", "project_name": "Apollo II"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["priority"], "Low");
    assert_eq!(updated["name"], "Apollo II");

    let (status, deleted) = send(&app, Method::DELETE, &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    let (status, after) = send(&app, Method::GET, &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(after["deleted_at"].is_string());

    let (status, _) = send(&app, Method::DELETE, &format!("/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_project_payloads_are_rejected_with_error_shape() {
    let app = test_app();
    let cases = [
        json!({"name": "No code"}),
        json!({"project_id": "PRJ-X", "name": "  "}),
        json!({"project_id": "PRJ-X", "name": "Apollo", "priority": "Urgent"}),
        json!({"project_id": "PRJ-X", "name": "Apollo", "total_weight": 9}),
    ];
    for payload in cases {
        let (status, body) = send(&app, Method::POST, "/api/projects", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "Validation failed");
        assert!(body["message"].is_string());
        assert!(body["details"].is_array());
    }

    let project_id = create_project(&app).await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/projects/{project_id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No valid fields to update");

    let (status, _) = send(&app, Method::GET, "/api/projects/PRJ-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_uses_error_shape() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/projects")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap_or_default();

    let (status, bytes, _) = send_raw(&app, request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn project_with_live_tasks_cannot_be_deleted() {
    let app = test_app();
    let project_id = create_project(&app).await;
    let (status, _) = create_task(&app, &project_id, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/projects/{project_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn resource_capacity_is_bounded() {
    let app = test_app();
    let resource_id = create_resource(&app, 40).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/resources/{resource_id}"),
        Some(json!({"weekly_capacity_hrs": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weekly_capacity_hrs"], 80);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/resources/{resource_id}"),
        Some(json!({"weekly_capacity_hrs": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn task_walks_forward_and_refuses_to_go_back() {
    let app = test_app();
    let project_id = create_project(&app).await;
    let resource_id = create_resource(&app, 40).await;

    let (status, created) = create_task(
        &app,
        &project_id,
        json!({"resource1_uuid": resource_id, "r1_estimate_hrs": 8}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["status"], "Backlog");
    let task_id = id_of(&created);
    let task_uri = format!("/api/tasks/{task_id}");

    let (status, body) = send(&app, Method::PATCH, &task_uri, Some(json!({"status": "in_progress"}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "In Progress");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &task_uri,
        Some(json!({"status": "Done", "completed_date": "2026-02-01", "r1_actual_hrs": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "Done");
    assert_eq!(body["resource1_uuid"], resource_id.as_str());

    let (status, body) = send(&app, Method::PATCH, &task_uri, Some(json!({"status": "Backlog"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid status transition");

    let (_, stored) = send(&app, Method::GET, &task_uri, None).await;
    assert_eq!(stored["status"], "Done");
    assert_eq!(stored["resource1_uuid"], resource_id.as_str());

    let (_, resource) = send(&app, Method::GET, &format!("/api/resources/{resource_id}"), None).await;
    assert!(resource["utilization_pct"].is_number());
    assert!(resource["current_allocation_hrs"].is_number());
}

#[tokio::test]
async fn done_requires_completion_evidence() {
    let app = test_app();
    let project_id = create_project(&app).await;
    let task_id = task_in_status(&app, &project_id, "In Progress").await;
    let uri = format!("/api/tasks/{task_id}");

    let (_, in_progress) = send(&app, Method::GET, &uri, None).await;
    assert!(in_progress["completed_date"].is_null());

    let rejected = [
        json!({"status": "Done"}),
        json!({"status": "Done", "completed_date": "2026-01-15"}),
        json!({"status": "Done", "r1_actual_hrs": 4}),
    ];
    for patch in rejected {
        let (status, body) = send(&app, Method::PATCH, &uri, Some(patch.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{patch}");
        assert_eq!(body["error"], "Invalid status transition");
    }

    let (_, stored) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(stored["status"], "In Progress");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(transition_patch("Done"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "Done");
}

#[tokio::test]
async fn overallocation_is_reported_as_warning() {
    let app = test_app();
    let project_id = create_project(&app).await;
    let resource_id = create_resource(&app, 10).await;

    let (status, body) = create_task(
        &app,
        &project_id,
        json!({"projectId": project_id, "resource1_uuid": resource_id, "r1_estimate_hrs": 25}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let warnings = body["warnings"].as_array().map(Vec::len).unwrap_or_default();
    assert_eq!(warnings, 1);
}

#[tokio::test]
async fn quality_gate_values_round_trip() {
    let app = test_app();
    let project_id = create_project(&app).await;

    let (status, defaults) = send(&app, Method::GET, &format!("/api/governance/gates/{project_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["data"]["is_default"], true);
    assert_eq!(defaults["data"]["min_pass_rate"], 95.0);

    let (status, saved) = send(
        &app,
        Method::POST,
        "/api/governance/gates",
        Some(json!({
            "project_id": project_id,
            "min_pass_rate": "92.5",
            "max_critical_defects": 1,
            "min_test_coverage": 70.25
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{saved}");

    let (_, gate) = send(&app, Method::GET, &format!("/api/governance/gates/{project_id}"), None).await;
    assert_eq!(gate["success"], true);
    assert_eq!(gate["data"]["min_pass_rate"].as_f64(), Some(92.5));
    assert_eq!(gate["data"]["max_critical_defects"], 1);
    assert_eq!(gate["data"]["min_test_coverage"].as_f64(), Some(70.25));
    assert_eq!(gate["data"]["is_default"], false);
}

#[tokio::test]
async fn gate_evaluation_uses_latest_run_when_body_is_empty() {
    let app = test_app();
    let project_id = create_project(&app).await;
    let evaluate_uri = format!("/api/governance/gates/{project_id}/evaluate");

    let (status, _) = send(&app, Method::POST, &evaluate_uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, run) = send(
        &app,
        Method::POST,
        "/api/governance/test-runs",
        Some(json!({
            "project_id": project_id,
            "total_tests": 100,
            "passed": 98,
            "failed": 2,
            "test_coverage_pct": 85
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{run}");

    let (status, evaluation) = send(&app, Method::POST, &evaluate_uri, None).await;
    assert_eq!(status, StatusCode::OK, "{evaluation}");
    assert_eq!(evaluation["data"]["passed"], true);

    let (status, evaluation) = send(
        &app,
        Method::POST,
        &evaluate_uri,
        Some(json!({"pass_rate_pct": 60, "critical_defects": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(evaluation["data"]["passed"], false);

    let (_, runs) = send(&app, Method::GET, &format!("/api/governance/test-runs/{project_id}"), None).await;
    assert_eq!(runs["count"], 1);
}

#[tokio::test]
async fn approvals_require_a_comment() {
    let app = test_app();
    let project_id = create_project(&app).await;

    for decision in ["approved", "rejected"] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/governance/approvals",
            Some(json!({"project_id": project_id, "status": decision})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/governance/approvals",
        Some(json!({"projectId": project_id, "approvalStatus": "approved", "comments": "ship it"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["approvalId"].is_string());
    assert_eq!(body["status"], "approved");
    assert_eq!(body["data"]["comment"], "ship it");

    let (status, approvals) = send(&app, Method::GET, &format!("/api/governance/approvals/{project_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approvals["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn release_readiness_lists_projects() {
    let app = test_app();
    let project_id = create_project(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/governance/release-readiness", None).await;
    assert_eq!(status, StatusCode::OK);
    let item = body
        .as_array()
        .and_then(|items| items.iter().find(|item| item["project_id"] == project_id.as_str()));
    assert_eq!(item.map(|item| item["status"].clone()), Some(json!("UNKNOWN")));

    let (_, filtered) = send(&app, Method::GET, "/api/governance/release-readiness?status=GREEN", None).await;
    assert_eq!(filtered.as_array().map(Vec::len), Some(0));

    let (status, summary) = send(&app, Method::GET, "/governance/dashboard-summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["data"]["unknown_count"], 1);
}

#[tokio::test]
async fn inline_reports_complete_and_download() {
    let app = test_app();
    create_project(&app).await;

    let (status, submitted) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(json!({"report_type": "project_status", "format": "csv"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{submitted}");
    assert_eq!(submitted["data"]["status"], "processing");
    let job_id = submitted["data"]["job_id"].as_str().unwrap_or_default().to_owned();

    let (status, job) = send(&app, Method::GET, &format!("/api/reports/{job_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "completed");
    assert_eq!(job["data"]["job_id"], job_id.as_str());

    let request = Request::builder()
        .uri(format!("/api/reports/{job_id}/download"))
        .body(Body::empty())
        .unwrap_or_default();
    let (status, bytes, content_type) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap_or_default().starts_with("text/csv"));
    assert!(String::from_utf8_lossy(&bytes).contains("Apollo"));

    let (status, listing) = send(&app, Method::GET, "/api/reports?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["pagination"]["total"], 1);
    assert_eq!(listing["pagination"]["limit"], 10);
}

#[tokio::test]
async fn unrendered_formats_fail_with_message() {
    let app = test_app();
    let (_, submitted) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(json!({"report_type": "dashboard", "format": "pdf"})),
    )
    .await;
    let job_id = submitted["data"]["job_id"].as_str().unwrap_or_default().to_owned();

    let (_, job) = send(&app, Method::GET, &format!("/api/reports/{job_id}"), None).await;
    assert_eq!(job["status"], "failed");
    assert!(job["data"]["error_message"].is_string());

    let (status, _) = send(&app, Method::GET, &format!("/api/reports/{job_id}/download"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, "/api/reports", Some(json!({"format": "json"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn writes_are_audited_with_snapshots() {
    let app = test_app();
    let project_id = create_project(&app).await;
    send(
        &app,
        Method::PATCH,
        &format!("/api/projects/{project_id}"),
        Some(json!({"description": "moon"})),
    )
    .await;
    send(&app, Method::DELETE, &format!("/api/projects/{project_id}"), None).await;

    let (status, entries) = send(
        &app,
        Method::GET,
        &format!("/api/audit-logs?entity=projects&id={project_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().cloned().unwrap_or_default();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["action"], "DELETE");
    assert!(entries[0]["before"].is_object());
    assert!(entries[0]["after"]["deleted_at"].is_string());
    assert_eq!(entries[0]["user_email"], "tester@example.com");
    assert_eq!(entries[1]["action"], "UPDATE");
    assert_eq!(entries[1]["changed_fields"], json!(["description"]));

    let (_, alias) = send(
        &app,
        Method::GET,
        &format!("/api/audit/logs?entity=project&entityId={project_id}"),
        None,
    )
    .await;
    assert_eq!(alias.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn worker_routes_are_hidden_without_secret() {
    let app = test_app();
    let (status, _) = send(&app, Method::POST, "/api/internal/worker/reports/claim", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn queued_jobs_are_claimed_by_authenticated_workers() {
    let mut config = ApiConfig::in_memory();
    config.report_execution_mode = ReportExecutionMode::Queued;
    config.worker_shared_secret = Some("s3cret".to_owned());
    let app = test_app_with(config);

    let (status, submitted) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(json!({"report_type": "dashboard"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = submitted["data"]["job_id"].clone();

    let claim = |secret: &str| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/internal/worker/reports/claim")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {secret}"))
            .header(WORKER_ID_HEADER, "worker-1")
            .body(Body::from(json!({"limit": 5}).to_string()))
            .unwrap_or_default()
    };

    let (status, _, _) = send_raw(&app, claim("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, bytes, _) = send_raw(&app, claim("s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    let claimed: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    assert_eq!(claimed["jobs"][0]["job_id"], job_id);

    let (_, again, _) = send_raw(&app, claim("s3cret")).await;
    let again: Value = serde_json::from_slice(&again).unwrap_or(Value::Null);
    assert_eq!(again["jobs"].as_array().map(Vec::len), Some(0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn backward_or_skipping_transitions_leave_task_unchanged(from in 0usize..4, to in 0usize..4) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build();
        prop_assert!(runtime.is_ok());
        let Ok(runtime) = runtime else {
            return Ok(());
        };

        let (from, to) = (STATUSES[from], STATUSES[to]);
        let allowed = from == to
            || matches!(
                (from, to),
                ("Backlog", "In Progress" | "Cancelled") | ("In Progress", "Done" | "Cancelled")
            );

        let (status, stored) = runtime.block_on(async {
            let app = test_app();
            let project_id = create_project(&app).await;
            let task_id = task_in_status(&app, &project_id, from).await;
            let uri = format!("/api/tasks/{task_id}");
            let (status, _) = send(&app, Method::PATCH, &uri, Some(transition_patch(to))).await;
            let (_, stored) = send(&app, Method::GET, &uri, None).await;
            (status, stored)
        });

        if allowed {
            prop_assert_eq!(status, StatusCode::OK);
            prop_assert_eq!(stored["status"].as_str(), Some(to));
        } else {
            prop_assert_eq!(status, StatusCode::BAD_REQUEST);
            prop_assert_eq!(stored["status"].as_str(), Some(from));
        }
    }
}
