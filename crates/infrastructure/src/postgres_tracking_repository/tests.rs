use chrono::Utc;
use gerbil_application::{ProjectRepository, ResourceRepository, TaskQuery, TaskRepository};
use gerbil_core::AppError;
use gerbil_domain::{
    Project, ProjectInput, Resource, ResourceInput, Task, TaskInput, TaskStatus,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::PostgresTrackingRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tracking tests: {error}");
    }

    Some(pool)
}

fn unique_code(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn task_code() -> String {
    format!("TSK-{}", Uuid::new_v4().simple()).to_ascii_uppercase()
}

fn project(code: &str) -> Project {
    Project::new(
        ProjectInput {
            project_code: code.to_owned(),
            name: format!("Project {code}"),
            ..ProjectInput::default()
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!())
}

fn resource(name: &str) -> Resource {
    Resource::new(
        ResourceInput {
            resource_name: name.to_owned(),
            email: Some("finley@gerbil.qc".to_owned()),
            weekly_capacity_hrs: Some(32),
            ..ResourceInput::default()
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn projects_round_trip_and_keep_live_codes_unique() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTrackingRepository::new(pool);
    let code = unique_code("PRJ");
    let mut stored = project(&code);
    assert!(repository.insert_project(&stored).await.is_ok());

    let duplicate = repository.insert_project(&project(&code)).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    stored.description = Some("migrated".to_owned());
    assert!(stored.soft_delete(Utc::now()).is_ok());
    assert!(repository.update_project(&stored).await.is_ok());
    assert!(repository.insert_project(&project(&code)).await.is_ok());

    let found = repository
        .find_project(stored.id)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(found.project_code.as_str(), code);
    assert_eq!(found.description.as_deref(), Some("migrated"));
    assert!(found.is_deleted());

    let live = repository.list_projects(false).await.unwrap_or_default();
    assert!(live.iter().all(|project| project.id != stored.id));
    let all = repository.list_projects(true).await.unwrap_or_default();
    assert!(all.iter().any(|project| project.id == stored.id));
}

#[tokio::test]
async fn updating_a_missing_project_is_not_found() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTrackingRepository::new(pool);
    let result = repository.update_project(&project(&unique_code("PRJ"))).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn resources_keep_email_and_capacity() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTrackingRepository::new(pool);
    let stored = resource(&unique_code("Finley"));
    assert!(repository.insert_resource(&stored).await.is_ok());

    let found = repository
        .find_resource(stored.id)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(found.weekly_capacity_hrs.hours(), 32);
    assert_eq!(
        found.email.as_ref().map(|email| email.as_str()),
        Some("finley@gerbil.qc")
    );
    assert!(found.is_active);
}

#[tokio::test]
async fn task_queries_filter_by_project_assignee_and_status() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresTrackingRepository::new(pool);
    let owner = project(&unique_code("PRJ"));
    let assignee = resource(&unique_code("Robin"));
    assert!(repository.insert_project(&owner).await.is_ok());
    assert!(repository.insert_resource(&assignee).await.is_ok());

    let assigned = Task::new(
        TaskInput {
            task_code: task_code(),
            project_id: owner.id,
            task_name: "Assigned".to_owned(),
            resource2_id: Some(assignee.id),
            r2_estimate_hrs: Some(6.5),
            tags: vec!["api".to_owned(), "qa".to_owned()],
            ..TaskInput::default()
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    let unassigned = Task::new(
        TaskInput {
            task_code: task_code(),
            project_id: owner.id,
            task_name: "Unassigned".to_owned(),
            ..TaskInput::default()
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(repository.insert_task(&assigned).await.is_ok());
    assert!(repository.insert_task(&unassigned).await.is_ok());

    let in_project = repository
        .list_tasks(TaskQuery::for_project(owner.id))
        .await
        .unwrap_or_default();
    assert_eq!(in_project.len(), 2);

    let for_assignee = repository
        .list_tasks(TaskQuery::for_resource(assignee.id))
        .await
        .unwrap_or_default();
    assert_eq!(for_assignee.len(), 1);
    assert_eq!(for_assignee[0].id, assigned.id);
    assert_eq!(for_assignee[0].tags, vec!["api".to_owned(), "qa".to_owned()]);
    assert!((for_assignee[0].r2_estimate_hrs - 6.5).abs() < f64::EPSILON);

    let done = repository
        .list_tasks(TaskQuery {
            status: Some(TaskStatus::Done),
            ..TaskQuery::for_project(owner.id)
        })
        .await
        .unwrap_or_default();
    assert!(done.is_empty());
}
