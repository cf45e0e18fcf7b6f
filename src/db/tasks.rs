//! Task CRUD operations.

use super::Database;
use crate::error::{StoreError, StoreResult};
use crate::store::TaskStore;
use crate::types::{PendingReasonType, Task, TaskDraft, TaskPatch, TaskStatus};
use async_trait::async_trait;
use rusqlite::{Connection, Row, ToSql, params};
use tracing::debug;

/// Read a column that may not exist yet in an old database file.
/// An absent column reads as NULL rather than an error, so a
/// half-migrated table stays usable.
fn optional_column<T: rusqlite::types::FromSql>(
    row: &Row,
    name: &str,
) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<T>>(name) {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::InvalidColumnName(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

pub(crate) fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: Option<i64> = optional_column(row, "status")?;
    let reason_type: Option<String> = optional_column(row, "pending_reason_type")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get::<_, Option<String>>("description")?.unwrap_or_default(),
        status: status.map(TaskStatus::from_code).unwrap_or_default(),
        expected_date: optional_column(row, "expected_date")?,
        pending_reason: optional_column(row, "pending_reason")?,
        pending_reason_type: reason_type.as_deref().and_then(PendingReasonType::from_str),
        related_task_id: optional_column(row, "related_task_id")?,
        created_at: optional_column(row, "created_at")?.unwrap_or_default(),
    })
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, id: i64) -> StoreResult<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

    match stmt.query_row(params![id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Translate a patch into SET fragments and positional parameters.
///
/// Columns come from the fixed whitelist below, never from caller
/// input; only fields present in the patch appear in the statement.
fn patch_assignments(patch: &TaskPatch) -> (Vec<String>, Vec<Box<dyn ToSql>>) {
    let mut assignments: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref title) = patch.title {
        values.push(Box::new(title.clone()));
        assignments.push(format!("title = ?{}", values.len()));
    }
    if let Some(ref description) = patch.description {
        values.push(Box::new(description.clone()));
        assignments.push(format!("description = ?{}", values.len()));
    }
    if let Some(status) = patch.status {
        values.push(Box::new(status.code()));
        assignments.push(format!("status = ?{}", values.len()));
    }
    if let Some(ref expected_date) = patch.expected_date {
        values.push(Box::new(expected_date.clone()));
        assignments.push(format!("expected_date = ?{}", values.len()));
    }
    if let Some(ref pending_reason) = patch.pending_reason {
        values.push(Box::new(pending_reason.clone()));
        assignments.push(format!("pending_reason = ?{}", values.len()));
    }
    if let Some(reason_type) = patch.pending_reason_type {
        values.push(Box::new(reason_type.map(|t| t.as_str())));
        assignments.push(format!("pending_reason_type = ?{}", values.len()));
    }
    if let Some(related) = patch.related_task_id {
        values.push(Box::new(related));
        assignments.push(format!("related_task_id = ?{}", values.len()));
    }

    (assignments, values)
}

impl Database {
    /// All tasks, most recently created first.
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM tasks ORDER BY id DESC")?;

            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(tasks)
        })
    }

    /// Get a task by id.
    pub fn get_task(&self, id: i64) -> StoreResult<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, id))
    }

    /// Insert a task and return the row as stored.
    ///
    /// The row is re-read by its assigned id so defaults applied by the
    /// database (created_at, status) come back exactly as stored rather
    /// than echoed from the input.
    pub fn insert_task(&self, draft: &TaskDraft) -> StoreResult<Task> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, status, expected_date,
                                    pending_reason, pending_reason_type, related_task_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    draft.title,
                    draft.description,
                    draft.status.code(),
                    draft.expected_date,
                    draft.pending_reason,
                    draft.pending_reason_type.map(|t| t.as_str()),
                    draft.related_task_id,
                ],
            )?;

            let id = conn.last_insert_rowid();
            debug!(id, "task inserted");

            get_task_internal(conn, id)?.ok_or(StoreError::NotFound(id))
        })
    }

    /// Apply a partial update and return the row as stored.
    ///
    /// Omitted fields are untouched; an empty patch degrades to a pure
    /// re-read. A missing id surfaces as [`StoreError::NotFound`].
    pub fn update_task(&self, id: i64, patch: &TaskPatch) -> StoreResult<Task> {
        self.with_conn(|conn| {
            let (assignments, mut values) = patch_assignments(patch);

            if !assignments.is_empty() {
                values.push(Box::new(id));
                let sql = format!(
                    "UPDATE tasks SET {} WHERE id = ?{}",
                    assignments.join(", "),
                    values.len()
                );

                let value_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
                let changed = conn.execute(&sql, value_refs.as_slice())?;
                debug!(id, fields = assignments.len(), changed, "task updated");
            }

            get_task_internal(conn, id)?.ok_or(StoreError::NotFound(id))
        })
    }

    /// Delete by id. Deleting a missing id is a no-op, not an error.
    pub fn delete_task(&self, id: i64) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            debug!(id, deleted, "task delete");
            Ok(())
        })
    }

    /// Total row count, for diagnostics.
    pub fn task_count(&self) -> StoreResult<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    /// Remove every task.
    pub fn clear_tasks(&self) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM tasks", [])?;
            Ok(())
        })
    }
}

/// The local store runs each call synchronously inside the async
/// boundary: every operation is short and the data volume is small.
#[async_trait]
impl TaskStore for Database {
    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        Database::list_tasks(self)
    }

    async fn insert_task(&self, draft: &TaskDraft) -> StoreResult<Task> {
        Database::insert_task(self, draft)
    }

    async fn update_task(&self, id: i64, patch: &TaskPatch) -> StoreResult<Task> {
        Database::update_task(self, id, patch)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<()> {
        Database::delete_task(self, id)
    }

    async fn task_count(&self) -> StoreResult<i64> {
        Database::task_count(self)
    }
}
