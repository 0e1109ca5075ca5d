use serde_json::{Value, json};
use tracing::warn;
use uuid::Uuid;

use crate::client::ContractClient;
use crate::error::{ContractError, ContractResult};
use crate::options::SuiteOptions;
use crate::payload::require_string;

/// Kind of entity a probe created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// `/projects`.
    Project,
    /// `/resources`.
    Resource,
    /// `/tasks`.
    Task,
}

impl FixtureKind {
    /// Collection path, without the API prefix.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Project => "/projects",
            Self::Resource => "/resources",
            Self::Task => "/tasks",
        }
    }
}

/// Entities created during one case, deleted in reverse order afterwards.
#[derive(Debug, Default)]
pub struct FixtureLedger {
    created: Vec<(FixtureKind, String)>,
}

impl FixtureLedger {
    /// Tracks a created entity.
    pub fn track(&mut self, kind: FixtureKind, id: &str) {
        self.created.push((kind, id.to_owned()));
    }

    /// Stops tracking an entity the case deleted itself.
    pub fn release(&mut self, kind: FixtureKind, id: &str) {
        self.created
            .retain(|(tracked_kind, tracked_id)| !(*tracked_kind == kind && tracked_id == id));
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.created.len()
    }

    /// Whether nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Deletes every tracked entity, newest first. Failures are logged and dropped.
    pub async fn cleanup(&mut self, client: &ContractClient) {
        while let Some((kind, id)) = self.created.pop() {
            let path = format!("{}/{id}", kind.collection());
            match client.delete(path.as_str()).await {
                Ok(response) if response.status < 400 => {}
                Ok(response) => warn!(
                    path = %path,
                    status = response.status,
                    "fixture cleanup was refused"
                ),
                Err(error) => warn!(path = %path, error = %error, "fixture cleanup failed"),
            }
        }
    }
}

/// Short random suffix for fixture codes.
#[must_use]
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

/// Client, options and the fixtures of the running case.
#[derive(Debug)]
pub struct ProbeContext {
    /// Bound API client.
    pub client: ContractClient,
    /// Options of the run.
    pub options: SuiteOptions,
    /// Entities to delete after the case.
    pub fixtures: FixtureLedger,
}

impl ProbeContext {
    /// Wraps a client with an empty ledger.
    #[must_use]
    pub fn new(client: ContractClient, options: SuiteOptions) -> Self {
        Self {
            client,
            options,
            fixtures: FixtureLedger::default(),
        }
    }

    /// Creates an entity, tracks it and returns `(id, body)`.
    pub async fn create(
        &mut self,
        kind: FixtureKind,
        payload: Value,
    ) -> ContractResult<(String, Value)> {
        let response = self.client.post(kind.collection(), &payload).await?;
        if !matches!(response.status, 200 | 201) {
            return Err(ContractError::Setup(format!(
                "creating fixture at {} returned {}: {}",
                response.path,
                response.status,
                response.text()
            )));
        }

        let body = response.json()?;
        let id = require_string(&body, &["id"], response.path.as_str())?;
        self.fixtures.track(kind, id.as_str());
        Ok((id, body))
    }

    /// Creates a project with a unique code.
    pub async fn create_project(&mut self, name: &str) -> ContractResult<(String, Value)> {
        let payload = json!({
            "project_id": format!("PROJ-TEST-{}", unique_suffix()),
            "name": name,
            "description": "Created by the contract suite",
            "priority": "Medium",
            "total_weight": 3,
        });
        self.create(FixtureKind::Project, payload).await
    }

    /// Creates a resource with the given weekly capacity.
    pub async fn create_resource(&mut self, capacity: u32) -> ContractResult<(String, Value)> {
        let payload = json!({
            "resource_name": format!("Contract Resource {}", unique_suffix()),
            "role": "QA Engineer",
            "department": "Quality",
            "email": format!("qa-{}@gerbil.qc", unique_suffix().to_lowercase()),
            "weekly_capacity_hrs": capacity,
        });
        self.create(FixtureKind::Resource, payload).await
    }

    /// Creates a task under `project_id`, merging `extra` into the base payload.
    pub async fn create_task(
        &mut self,
        project_id: &str,
        extra: Value,
    ) -> ContractResult<(String, Value)> {
        let mut payload = json!({
            "task_id": task_code(),
            "project_id": project_id,
            "task_name": "Contract suite task",
        });
        if let (Some(payload), Value::Object(extra)) = (payload.as_object_mut(), extra) {
            payload.extend(extra);
        }
        self.create(FixtureKind::Task, payload).await
    }

    /// Deletes everything the case created.
    pub async fn cleanup(&mut self) {
        self.fixtures.cleanup(&self.client).await;
    }
}

/// Fresh task code in the `TSK-` namespace the API accepts.
pub(crate) fn task_code() -> String {
    format!("TSK-{}", unique_suffix())
}
