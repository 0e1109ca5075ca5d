use gerbil_core::AppError;
use gerbil_domain::{AuditAction, Priority, ProjectChanges, ProjectInput};

use crate::test_support::Harness;

#[tokio::test]
async fn create_project_audits_and_publishes() {
    let harness = Harness::default();
    let project = harness.project("PRJ-ALPHA").await;

    let events = harness.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::Create);
    assert_eq!(events[0].entity_id, project.id.to_string());
    assert_eq!(events[0].actor.as_str(), "qa@gerbil.qc");
    assert_eq!(harness.notifier.kinds().await, vec!["project-created"]);
}

#[tokio::test]
async fn create_project_rejects_blank_name() {
    let harness = Harness::default();
    let result = harness
        .project_service()
        .create_project(
            &Harness::actor(),
            ProjectInput {
                project_code: "PRJ-1".to_owned(),
                name: "   ".to_owned(),
                ..ProjectInput::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(harness.audit.events().await.is_empty());
}

#[tokio::test]
async fn update_project_records_changed_fields() {
    let harness = Harness::default();
    let project = harness.project("PRJ-BETA").await;

    let updated = harness
        .project_service()
        .update_project(
            &Harness::actor(),
            project.id,
            ProjectChanges {
                priority: Some(Priority::High),
                ..ProjectChanges::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(updated.project.priority, Priority::High);
    let events = harness.audit.events().await;
    assert_eq!(events[1].action, AuditAction::Update);
    assert_eq!(events[1].changed_fields, vec!["priority".to_owned()]);
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let harness = Harness::default();
    let project = harness.project("PRJ-GAMMA").await;

    let result = harness
        .project_service()
        .update_project(&Harness::actor(), project.id, ProjectChanges::default())
        .await;

    assert!(matches!(result, Err(AppError::Validation(message)) if message == "No valid fields to update"));
}

#[tokio::test]
async fn delete_is_blocked_by_live_tasks() {
    let harness = Harness::default();
    let project = harness.project("PRJ-DELTA").await;
    let service = harness.project_service();
    let created = harness
        .task_service()
        .create_task(&Harness::actor(), Harness::task_input("TSK-1", project.id))
        .await
        .unwrap_or_else(|_| unreachable!());

    let blocked = service.delete_project(&Harness::actor(), project.id).await;
    assert!(matches!(blocked, Err(AppError::Conflict(_))));

    assert!(
        harness
            .task_service()
            .delete_task(&Harness::actor(), created.view.task.id)
            .await
            .is_ok()
    );
    let deleted = service
        .delete_project(&Harness::actor(), project.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(deleted.project.deleted_at.is_some());
}

#[tokio::test]
async fn deleted_projects_stay_readable_but_frozen() {
    let harness = Harness::default();
    let project = harness.project("PRJ-EPSILON").await;
    let service = harness.project_service();
    assert!(service.delete_project(&Harness::actor(), project.id).await.is_ok());

    let fetched = service
        .get_project(project.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(fetched.project.is_deleted());
    assert!(service.list_projects().await.unwrap_or_default().is_empty());

    let second_delete = service.delete_project(&Harness::actor(), project.id).await;
    assert!(matches!(second_delete, Err(AppError::Validation(_))));

    let patch = service
        .update_project(
            &Harness::actor(),
            project.id,
            ProjectChanges {
                name: Some("Renamed".to_owned()),
                ..ProjectChanges::default()
            },
        )
        .await;
    assert!(matches!(patch, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn list_projects_includes_progress() {
    let harness = Harness::default();
    let project = harness.project("PRJ-ZETA").await;
    let tasks = harness.task_service();
    assert!(
        tasks
            .create_task(&Harness::actor(), Harness::task_input("TSK-A", project.id))
            .await
            .is_ok()
    );
    assert!(
        tasks
            .create_task(&Harness::actor(), Harness::task_input("TSK-B", project.id))
            .await
            .is_ok()
    );

    let projects = harness
        .project_service()
        .list_projects()
        .await
        .unwrap_or_default();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].progress.total_tasks, 2);
    assert_eq!(projects[0].progress.completion_pct, 0.0);
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let harness = Harness::default();
    let result = harness.project_service().get_project(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
