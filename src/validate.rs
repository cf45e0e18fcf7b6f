//! Write-side checks the presentation layer runs before touching a
//! store.
//!
//! The store accepts whatever partial update it is given; these rules
//! are the caller's side of that contract. A failed check means no
//! store call happens at all, so there are never partial writes.

use crate::types::{PendingReasonType, TaskStatus};
use thiserror::Error;

/// User-input failures, surfaced before any store call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("a pending task needs a reason")]
    MissingPendingReason,

    #[error("a pending task blocked on a task needs a related task")]
    MissingRelatedTask,

    #[error("a task cannot be blocked by itself")]
    SelfReference,
}

/// Validate form values before they reach a store.
///
/// `task_id` is the id being edited; inserts pass `None`. Entering
/// `Pending` requires exactly one blocking cause: a non-blank free-text
/// reason for [`PendingReasonType::Other`], or a related task that is
/// not the task itself for [`PendingReasonType::Task`].
pub fn check_write(
    task_id: Option<i64>,
    title: &str,
    status: TaskStatus,
    pending_reason_type: Option<PendingReasonType>,
    pending_reason: Option<&str>,
    related_task_id: Option<i64>,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }

    if status != TaskStatus::Pending {
        return Ok(());
    }

    match pending_reason_type.unwrap_or(PendingReasonType::Other) {
        PendingReasonType::Other => {
            if pending_reason.is_none_or(|r| r.trim().is_empty()) {
                return Err(ValidationError::MissingPendingReason);
            }
        }
        PendingReasonType::Task => {
            let related = related_task_id.ok_or(ValidationError::MissingRelatedTask)?;
            if task_id == Some(related) {
                return Err(ValidationError::SelfReference);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let result = check_write(None, "  ", TaskStatus::NotSet, None, None, None);
        assert_eq!(result, Err(ValidationError::MissingTitle));
    }

    #[test]
    fn non_pending_status_needs_only_a_title() {
        for status in [TaskStatus::NotSet, TaskStatus::Completed] {
            assert!(check_write(None, "Buy milk", status, None, None, None).is_ok());
        }
    }

    #[test]
    fn pending_with_blank_free_text_reason_is_rejected() {
        let result = check_write(
            None,
            "Buy milk",
            TaskStatus::Pending,
            Some(PendingReasonType::Other),
            Some("   "),
            None,
        );
        assert_eq!(result, Err(ValidationError::MissingPendingReason));
    }

    #[test]
    fn pending_defaults_to_free_text_when_type_is_absent() {
        let result = check_write(None, "Buy milk", TaskStatus::Pending, None, None, None);
        assert_eq!(result, Err(ValidationError::MissingPendingReason));
    }

    #[test]
    fn pending_on_task_without_reference_is_rejected() {
        let result = check_write(
            None,
            "Buy milk",
            TaskStatus::Pending,
            Some(PendingReasonType::Task),
            None,
            None,
        );
        assert_eq!(result, Err(ValidationError::MissingRelatedTask));
    }

    #[test]
    fn task_cannot_wait_on_itself() {
        let result = check_write(
            Some(7),
            "Buy milk",
            TaskStatus::Pending,
            Some(PendingReasonType::Task),
            None,
            Some(7),
        );
        assert_eq!(result, Err(ValidationError::SelfReference));
    }

    #[test]
    fn valid_pending_writes_pass() {
        assert!(
            check_write(
                None,
                "Buy milk",
                TaskStatus::Pending,
                Some(PendingReasonType::Other),
                Some("waiting on payday"),
                None,
            )
            .is_ok()
        );

        assert!(
            check_write(
                Some(7),
                "Buy milk",
                TaskStatus::Pending,
                Some(PendingReasonType::Task),
                None,
                Some(3),
            )
            .is_ok()
        );
    }
}
