use chrono::NaiveDate;
use gerbil_core::AppError;
use gerbil_domain::{TaskChanges, TaskInput, TaskStatus};
use uuid::Uuid;

use crate::test_support::Harness;
use crate::tracking_ports::TaskQuery;

fn status(status: TaskStatus) -> TaskChanges {
    TaskChanges {
        status: Some(status),
        ..TaskChanges::default()
    }
}

#[tokio::test]
async fn task_requires_live_project() {
    let harness = Harness::default();
    let result = harness
        .task_service()
        .create_task(&Harness::actor(), Harness::task_input("TSK-1", Uuid::new_v4()))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn task_requires_live_assignees() {
    let harness = Harness::default();
    let project = harness.project("PRJ-T0").await;
    let result = harness
        .task_service()
        .create_task(
            &Harness::actor(),
            TaskInput {
                resource1_id: Some(Uuid::new_v4()),
                ..Harness::task_input("TSK-1", project.id)
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn lifecycle_moves_forward_and_never_back() {
    let harness = Harness::default();
    let project = harness.project("PRJ-T1").await;
    let resource = harness.resource("Dana", 40).await;
    let service = harness.task_service();
    let actor = Harness::actor();

    let created = service
        .create_task(
            &actor,
            TaskInput {
                resource1_id: Some(resource.id),
                r1_estimate_hrs: Some(8.0),
                ..Harness::task_input("TSK-FLOW", project.id)
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let task_id = created.view.task.id;
    assert_eq!(created.view.task.status, TaskStatus::Backlog);

    let started = service
        .update_task(&actor, task_id, status(TaskStatus::InProgress))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(started.view.task.status, TaskStatus::InProgress);
    assert!(started.view.task.actual_start_date.is_some());

    let done = service
        .update_task(
            &actor,
            task_id,
            TaskChanges {
                status: Some(TaskStatus::Done),
                completed_date: NaiveDate::from_ymd_opt(2026, 1, 15),
                r1_actual_hrs: Some(7.5),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(done.view.task.status, TaskStatus::Done);
    assert_eq!(done.view.task.resource1_id, Some(resource.id));

    let backwards = service
        .update_task(&actor, task_id, status(TaskStatus::Backlog))
        .await;
    assert!(matches!(backwards, Err(AppError::InvalidTransition(_))));

    let stored = service
        .get_task(task_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.task.status, TaskStatus::Done);
    assert!(harness.notifier.kinds().await.contains(&"task-completed"));
}

#[tokio::test]
async fn done_requires_completion_date_and_actuals() {
    let harness = Harness::default();
    let project = harness.project("PRJ-T2").await;
    let service = harness.task_service();
    let actor = Harness::actor();
    let task_id = service
        .create_task(&actor, Harness::task_input("TSK-DONE", project.id))
        .await
        .unwrap_or_else(|_| unreachable!())
        .view
        .task
        .id;
    assert!(
        service
            .update_task(&actor, task_id, status(TaskStatus::InProgress))
            .await
            .is_ok()
    );

    let without_date = service
        .update_task(&actor, task_id, status(TaskStatus::Done))
        .await;
    assert!(matches!(without_date, Err(AppError::InvalidTransition(_))));

    let without_hours = service
        .update_task(
            &actor,
            task_id,
            TaskChanges {
                status: Some(TaskStatus::Done),
                completed_date: NaiveDate::from_ymd_opt(2026, 1, 15),
                ..TaskChanges::default()
            },
        )
        .await;
    assert!(matches!(without_hours, Err(AppError::InvalidTransition(_))));

    let stored = service
        .get_task(task_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.task.status, TaskStatus::InProgress);
    assert!(stored.task.completed_date.is_none());
}

#[tokio::test]
async fn overallocation_produces_warning_and_hook() {
    let harness = Harness::default();
    let project = harness.project("PRJ-T3").await;
    let resource = harness.resource("Emery", 10).await;
    let service = harness.task_service();

    let first = service
        .create_task(
            &Harness::actor(),
            TaskInput {
                resource1_id: Some(resource.id),
                r1_estimate_hrs: Some(6.0),
                ..Harness::task_input("TSK-W1", project.id)
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(first.warnings.is_empty());

    let second = service
        .create_task(
            &Harness::actor(),
            TaskInput {
                resource1_id: Some(resource.id),
                r1_estimate_hrs: Some(6.0),
                ..Harness::task_input("TSK-W2", project.id)
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(second.warnings.len(), 1);
    assert!(second.warnings[0].contains("Emery"));
    assert!(
        harness
            .notifier
            .kinds()
            .await
            .contains(&"resource-overallocated")
    );
}

#[tokio::test]
async fn delete_cancels_and_hides_task() {
    let harness = Harness::default();
    let project = harness.project("PRJ-T4").await;
    let service = harness.task_service();
    let task_id = service
        .create_task(&Harness::actor(), Harness::task_input("TSK-DEL", project.id))
        .await
        .unwrap_or_else(|_| unreachable!())
        .view
        .task
        .id;

    let deleted = service
        .delete_task(&Harness::actor(), task_id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(deleted.task.status, TaskStatus::Cancelled);
    assert!(
        service
            .list_tasks(TaskQuery::for_project(project.id))
            .await
            .unwrap_or_default()
            .is_empty()
    );

    let patch = service
        .update_task(&Harness::actor(), task_id, status(TaskStatus::InProgress))
        .await;
    assert!(matches!(patch, Err(AppError::NotFound(_))));
}
