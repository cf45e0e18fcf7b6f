//! Core types for the task tracker.

use serde::{Deserialize, Serialize};

/// Tri-state completion status, stored as an integer code.
///
/// Codes outside the known set read as `NotSet` so rows written by a
/// later schema generation stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TaskStatus {
    #[default]
    NotSet,
    Pending,
    Completed,
}

impl TaskStatus {
    pub const fn code(self) -> i64 {
        match self {
            TaskStatus::NotSet => -1,
            TaskStatus::Pending => 0,
            TaskStatus::Completed => 1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => TaskStatus::Pending,
            1 => TaskStatus::Completed,
            _ => TaskStatus::NotSet,
        }
    }
}

impl From<i64> for TaskStatus {
    fn from(code: i64) -> Self {
        TaskStatus::from_code(code)
    }
}

impl From<TaskStatus> for i64 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

/// Discriminator for what is blocking a pending task: another task, or
/// a free-text motive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReasonType {
    Task,
    Other,
}

impl PendingReasonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingReasonType::Task => "task",
            PendingReasonType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task" => Some(PendingReasonType::Task),
            "other" => Some(PendingReasonType::Other),
            _ => None,
        }
    }
}

/// A task row as stored.
///
/// `pending_reason`, `pending_reason_type` and `related_task_id` are
/// only meaningful while `status` is `Pending`; writers clear them on
/// any transition away (see [`crate::validate`]). `related_task_id` is
/// a weak reference: the target may have been deleted since, and
/// readers resolve it through [`find_related`] instead of assuming it
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub expected_date: Option<String>,
    #[serde(default)]
    pub pending_reason: Option<String>,
    #[serde(default)]
    pub pending_reason_type: Option<PendingReasonType>,
    #[serde(default)]
    pub related_task_id: Option<i64>,
    #[serde(default)]
    pub created_at: String,
}

/// Input for creating a task. Everything but the title defaults to
/// unset; the store stamps id and created_at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub expected_date: Option<String>,
    #[serde(default)]
    pub pending_reason: Option<String>,
    #[serde(default)]
    pub pending_reason_type: Option<PendingReasonType>,
    #[serde(default)]
    pub related_task_id: Option<i64>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update over a task row.
///
/// `None` leaves a field untouched. For nullable columns the inner
/// option distinguishes "set to a value" from "clear to NULL"
/// (`Some(None)`), which is the distinction the UPDATE statement needs.
/// `id` and `created_at` are immutable by omission.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub expected_date: Option<Option<String>>,
    pub pending_reason: Option<Option<String>>,
    pub pending_reason_type: Option<Option<PendingReasonType>>,
    pub related_task_id: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.expected_date.is_none()
            && self.pending_reason.is_none()
            && self.pending_reason_type.is_none()
            && self.related_task_id.is_none()
    }

    /// Clear the pending triplet. Callers apply this whenever a status
    /// change leaves `Pending`.
    pub fn clear_pending_fields(&mut self) {
        self.pending_reason = Some(None);
        self.pending_reason_type = Some(None);
        self.related_task_id = Some(None);
    }
}

/// Resolve a weak task reference against a fetched list.
///
/// A miss means the target was deleted since the reference was written;
/// the caller renders its "unknown task" fallback.
pub fn find_related(tasks: &[Task], related_task_id: i64) -> Option<&Task> {
    tasks.iter().find(|t| t.id == related_task_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [TaskStatus::NotSet, TaskStatus::Pending, TaskStatus::Completed] {
            assert_eq!(TaskStatus::from_code(status.code()), status);
        }
    }

    #[test]
    fn unknown_status_code_reads_as_not_set() {
        assert_eq!(TaskStatus::from_code(7), TaskStatus::NotSet);
        assert_eq!(TaskStatus::from_code(-2), TaskStatus::NotSet);
    }

    #[test]
    fn status_serializes_as_integer_code() {
        let json = serde_json::to_string(&TaskStatus::Completed).unwrap();
        assert_eq!(json, "1");

        let parsed: TaskStatus = serde_json::from_str("-1").unwrap();
        assert_eq!(parsed, TaskStatus::NotSet);
    }

    #[test]
    fn reason_type_str_round_trip() {
        assert_eq!(
            PendingReasonType::from_str(PendingReasonType::Task.as_str()),
            Some(PendingReasonType::Task)
        );
        assert_eq!(PendingReasonType::from_str("neither"), None);
    }

    #[test]
    fn clear_pending_fields_sets_all_three_to_null() {
        let mut patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        patch.clear_pending_fields();

        assert_eq!(patch.pending_reason, Some(None));
        assert_eq!(patch.pending_reason_type, Some(None));
        assert_eq!(patch.related_task_id, Some(None));
    }

    #[test]
    fn find_related_tolerates_dangling_reference() {
        let tasks = vec![Task {
            id: 3,
            title: "only".into(),
            description: String::new(),
            status: TaskStatus::NotSet,
            expected_date: None,
            pending_reason: None,
            pending_reason_type: None,
            related_task_id: None,
            created_at: String::new(),
        }];

        assert!(find_related(&tasks, 3).is_some());
        assert!(find_related(&tasks, 99).is_none());
    }
}
