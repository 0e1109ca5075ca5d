use gerbil_core::AppError;
use gerbil_domain::{ResourceChanges, TaskInput};

use crate::test_support::Harness;

#[tokio::test]
async fn capacity_bound_is_enforced_on_update() {
    let harness = Harness::default();
    let resource = harness.resource("Avery", 40).await;
    let service = harness.resource_service();

    let at_limit = service
        .update_resource(
            &Harness::actor(),
            resource.id,
            ResourceChanges {
                weekly_capacity_hrs: Some(80),
                ..ResourceChanges::default()
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(at_limit.resource.weekly_capacity_hrs.hours(), 80);

    let over = service
        .update_resource(
            &Harness::actor(),
            resource.id,
            ResourceChanges {
                weekly_capacity_hrs: Some(100),
                ..ResourceChanges::default()
            },
        )
        .await;
    assert!(matches!(over, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn allocation_counts_open_assigned_tasks() {
    let harness = Harness::default();
    let project = harness.project("PRJ-RES").await;
    let resource = harness.resource("Blake", 10).await;
    assert!(
        harness
            .task_service()
            .create_task(
                &Harness::actor(),
                TaskInput {
                    resource1_id: Some(resource.id),
                    r1_estimate_hrs: Some(6.0),
                    ..Harness::task_input("TSK-R1", project.id)
                },
            )
            .await
            .is_ok()
    );

    let view = harness
        .resource_service()
        .get_resource(resource.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(view.allocation.current_allocation_hrs, 6.0);
    assert_eq!(view.allocation.utilization_pct, 60.0);
    assert!(!view.allocation.is_overallocated);
}

#[tokio::test]
async fn delete_marks_resource_inactive() {
    let harness = Harness::default();
    let resource = harness.resource("Casey", 40).await;
    let service = harness.resource_service();

    let deleted = service
        .delete_resource(&Harness::actor(), resource.id)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(!deleted.resource.is_active);
    assert!(deleted.resource.deleted_at.is_some());
    assert!(service.list_resources().await.unwrap_or_default().is_empty());
    assert!(service.get_resource(resource.id).await.is_ok());
}
