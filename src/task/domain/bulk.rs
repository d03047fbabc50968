//! Collect-all validation for operations applied to many tasks at once.

use super::transition::check_status_change;
use super::{StatusCatalog, StatusCode, Task, TaskId, User, WorkflowError, can_delete};
use std::fmt;

/// One task that blocks a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkViolation {
    /// Offending task.
    pub task_id: TaskId,
    /// Offending task title, for reporting.
    pub title: String,
    /// Why the task blocks the batch.
    pub error: WorkflowError,
}

impl BulkViolation {
    fn new(task: &Task, error: WorkflowError) -> Self {
        Self {
            task_id: task.id(),
            title: task.title().to_owned(),
            error,
        }
    }
}

impl fmt::Display for BulkViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.title, self.error)
    }
}

/// Validates moving every task in `tasks` to `target`.
///
/// Each task is checked for edit permission and then, when `target` is the
/// done code, for open subtasks. Every violation is reported; an empty
/// result means the whole batch may be applied.
#[must_use]
pub fn validate_bulk_status_change(
    tasks: &[Task],
    target: &StatusCode,
    catalog: &StatusCatalog,
    user: &User,
) -> Vec<BulkViolation> {
    tasks
        .iter()
        .filter_map(|task| {
            check_status_change(task, target, catalog, user)
                .err()
                .map(|error| BulkViolation::new(task, error))
        })
        .collect()
}

/// Validates deleting every task in `tasks`.
#[must_use]
pub fn validate_bulk_delete(tasks: &[Task], user: &User) -> Vec<BulkViolation> {
    tasks
        .iter()
        .filter(|task| !can_delete(task, user))
        .map(|task| {
            BulkViolation::new(
                task,
                WorkflowError::PermissionDenied {
                    task_id: task.id(),
                    user_id: user.id().clone(),
                },
            )
        })
        .collect()
}
