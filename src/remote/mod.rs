//! REST-backed task store speaking a PostgREST-style wire contract.
//!
//! The remote table is the earliest schema generation: the target date
//! column is still named `due_date`, status is the binary model with a
//! NOT NULL pending default, and the pending-reason columns do not
//! exist. The wire row type owns that mapping so the rest of the crate
//! only ever sees the current [`Task`] shape. Transport failures and
//! `{message}` error payloads surface through the same [`StoreError`]
//! taxonomy as the local store; there is no retry and no backoff.

use crate::config::RemoteConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::TaskStore;
use crate::types::{Task, TaskDraft, TaskPatch, TaskStatus};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A `tasks` row as the remote backend sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireTask {
    id: i64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    status: i64,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<WireTask> for Task {
    fn from(row: WireTask) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            status: TaskStatus::from_code(row.status),
            expected_date: row.due_date,
            pending_reason: None,
            pending_reason_type: None,
            related_task_id: None,
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}

/// Error payload the backend returns on a non-2xx response.
#[derive(Debug, Default, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
}

/// Insert payload. Status is always sent: the legacy column is NOT
/// NULL with no tri-state, so an unset status goes out as pending.
#[derive(Debug, Serialize)]
struct InsertBody<'a> {
    title: &'a str,
    description: &'a str,
    status: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<&'a str>,
}

impl<'a> InsertBody<'a> {
    fn from_draft(draft: &'a TaskDraft) -> Self {
        Self {
            title: &draft.title,
            description: &draft.description,
            status: legacy_status_code(draft.status),
            due_date: draft.expected_date.as_deref(),
        }
    }
}

/// Patch payload; only provided fields are serialized, and an explicit
/// clear goes out as `null`.
#[derive(Debug, Default, Serialize)]
struct PatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<Option<&'a str>>,
}

impl<'a> PatchBody<'a> {
    /// The pending-reason fields have no remote counterpart (the table
    /// predates them) and are omitted from the wire.
    fn from_patch(patch: &'a TaskPatch) -> Self {
        Self {
            title: patch.title.as_deref(),
            description: patch.description.as_deref(),
            status: patch.status.map(legacy_status_code),
            due_date: patch.expected_date.as_ref().map(|d| d.as_deref()),
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }
}

/// Map the tri-state status onto the legacy binary column.
fn legacy_status_code(status: TaskStatus) -> i64 {
    match status {
        TaskStatus::Completed => 1,
        // The legacy model has no "not set"; it reads as pending.
        TaskStatus::NotSet | TaskStatus::Pending => 0,
    }
}

/// Task store over a remote relational table, one `tasks` resource.
pub struct RestTaskStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestTaskStore {
    /// Build a client from connection settings. The api key rides on
    /// every request as both `apikey` and bearer token.
    pub fn new(config: &RemoteConfig) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let value = HeaderValue::from_str(&config.api_key)
                .map_err(|_| StoreError::backend("api key is not a valid header value"))?;
            headers.insert("apikey", value);
            let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| StoreError::backend("api key is not a valid header value"))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    /// Pass a successful response through; read the `{message}` payload
    /// out of anything else.
    async fn checked(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .json::<WireError>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        let message = if message.is_empty() {
            format!("request failed with status {}", status)
        } else {
            message
        };

        Err(StoreError::Backend { message })
    }
}

#[async_trait]
impl TaskStore for RestTaskStore {
    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let response = self
            .client
            .get(self.tasks_url())
            .query(&[("select", "*"), ("order", "id.desc")])
            .send()
            .await?;

        let rows: Vec<WireTask> = Self::checked(response).await?.json().await?;
        debug!(count = rows.len(), "remote list");

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn insert_task(&self, draft: &TaskDraft) -> StoreResult<Task> {
        let response = self
            .client
            .post(self.tasks_url())
            .header("Prefer", "return=representation")
            .json(&[InsertBody::from_draft(draft)])
            .send()
            .await?;

        let mut rows: Vec<WireTask> = Self::checked(response).await?.json().await?;

        rows.pop()
            .map(Task::from)
            .ok_or_else(|| StoreError::backend("insert returned no row"))
    }

    async fn update_task(&self, id: i64, patch: &TaskPatch) -> StoreResult<Task> {
        let body = PatchBody::from_patch(patch);
        if body.is_empty() {
            // Nothing the remote generation can apply; degrade to a
            // single-row read so not-found still surfaces.
            let filter = format!("eq.{}", id);
            let response = self
                .client
                .get(self.tasks_url())
                .query(&[("select", "*"), ("id", filter.as_str())])
                .send()
                .await?;
            let mut rows: Vec<WireTask> = Self::checked(response).await?.json().await?;
            return rows.pop().map(Task::from).ok_or(StoreError::NotFound(id));
        }

        let response = self
            .client
            .patch(self.tasks_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let mut rows: Vec<WireTask> = Self::checked(response).await?.json().await?;

        // An empty representation means the filter matched no row.
        rows.pop().map(Task::from).ok_or(StoreError::NotFound(id))
    }

    async fn delete_task(&self, id: i64) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.tasks_url())
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        Self::checked(response).await?;
        Ok(())
    }

    async fn task_count(&self) -> StoreResult<i64> {
        let response = self
            .client
            .head(self.tasks_url())
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let response = Self::checked(response).await?;
        let count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| StoreError::backend("count missing from content-range"))?;

        Ok(count)
    }
}
