//! The store contract both backends implement.

use crate::error::StoreResult;
use crate::types::{Task, TaskDraft, TaskPatch};
use async_trait::async_trait;

/// CRUD contract over the task table.
///
/// Callers follow a fetch-after-mutate discipline: one logical
/// operation at a time, with a full [`list_tasks`](Self::list_tasks)
/// re-read after every write instead of patching cached state. The
/// local implementation runs each call as a short blocking operation
/// inside the async boundary; the remote implementation awaits the
/// network. Both surface failures as the same [`StoreError`]
/// taxonomy, and neither retries.
///
/// [`StoreError`]: crate::error::StoreError
#[async_trait]
pub trait TaskStore {
    /// All tasks, most recently created first.
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Insert a task and return the row as stored.
    async fn insert_task(&self, draft: &TaskDraft) -> StoreResult<Task>;

    /// Apply a partial update and return the row as stored. A missing
    /// id is a distinguishable not-found error, never a silent success.
    async fn update_task(&self, id: i64, patch: &TaskPatch) -> StoreResult<Task>;

    /// Delete by id. Deleting a missing id is not an error.
    async fn delete_task(&self, id: i64) -> StoreResult<()>;

    /// Total row count, for diagnostics.
    async fn task_count(&self) -> StoreResult<i64>;
}
