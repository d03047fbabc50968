//! Status transition validation and application.

use super::{
    AuditEntry, StatusCatalog, StatusCode, Task, TaskId, User, UserId, WorkflowError, can_edit,
};
use mockable::Clock;

/// Returns the statuses `task` may move to next, in catalog order.
///
/// Unknown or inactive current statuses yield no transitions, inactive
/// targets are skipped, and the done code is withheld while any subtask is
/// still open.
#[must_use]
pub fn valid_transitions(task: &Task, catalog: &StatusCatalog) -> Vec<StatusCode> {
    let Some(current) = catalog.find_active(task.status()) else {
        return Vec::new();
    };
    let subtasks_open = task.incomplete_subtasks(catalog) > 0;

    catalog
        .definitions()
        .iter()
        .filter(|def| def.is_active() && current.allows(def.code()))
        .filter(|def| !(subtasks_open && catalog.is_done(def.code())))
        .map(|def| def.code().clone())
        .collect()
}

/// Details shown to the user before a final status change is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    /// Task awaiting confirmation.
    pub task_id: TaskId,
    /// Task title.
    pub task_title: String,
    /// Current status code.
    pub from: StatusCode,
    /// Label of the current status.
    pub from_label: String,
    /// Requested status code.
    pub to: StatusCode,
    /// Label of the requested status.
    pub to_label: String,
}

/// Result of a status change request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChangeOutcome {
    /// The change was applied and recorded.
    Applied(AuditEntry),
    /// The target is final; the caller must confirm and retry without
    /// requesting confirmation. Nothing was changed.
    PendingConfirmation(ConfirmationRequest),
}

/// Validates and applies a status change to `task`.
///
/// Checks run in order: permission, open subtasks for the done code, then
/// transition membership. A final target with `require_confirmation` set
/// yields [`StatusChangeOutcome::PendingConfirmation`]. The task is only
/// mutated when an [`AuditEntry`] is returned.
///
/// # Errors
///
/// Returns [`WorkflowError::PermissionDenied`],
/// [`WorkflowError::IncompleteSubtasks`] or
/// [`WorkflowError::InvalidTransition`].
pub fn apply_status_change(
    task: &mut Task,
    target: &StatusCode,
    catalog: &StatusCatalog,
    user: &User,
    require_confirmation: bool,
    clock: &impl Clock,
) -> Result<StatusChangeOutcome, WorkflowError> {
    check_status_change(task, target, catalog, user)?;
    if !valid_transitions(task, catalog).contains(target) {
        return Err(WorkflowError::InvalidTransition {
            task_id: task.id(),
            from: task.status().clone(),
            to: target.clone(),
        });
    }

    if require_confirmation && catalog.is_final(target) {
        return Ok(StatusChangeOutcome::PendingConfirmation(
            ConfirmationRequest {
                task_id: task.id(),
                task_title: task.title().to_owned(),
                from: task.status().clone(),
                from_label: catalog.label_for(task.status()),
                to: target.clone(),
                to_label: catalog.label_for(target),
            },
        ));
    }

    Ok(StatusChangeOutcome::Applied(force_status(
        task,
        target,
        catalog,
        user.id(),
        clock,
    )))
}

/// Permission and subtask checks shared by single and bulk status changes.
pub(crate) fn check_status_change(
    task: &Task,
    target: &StatusCode,
    catalog: &StatusCatalog,
    user: &User,
) -> Result<(), WorkflowError> {
    if !can_edit(task, user) {
        return Err(WorkflowError::PermissionDenied {
            task_id: task.id(),
            user_id: user.id().clone(),
        });
    }
    let remaining = task.incomplete_subtasks(catalog);
    if catalog.is_done(target) && remaining > 0 {
        return Err(WorkflowError::IncompleteSubtasks {
            task_id: task.id(),
            remaining,
        });
    }
    Ok(())
}

/// Moves `task` to `target` and returns the matching audit entry.
pub(crate) fn force_status(
    task: &mut Task,
    target: &StatusCode,
    catalog: &StatusCatalog,
    actor_id: &UserId,
    clock: &impl Clock,
) -> AuditEntry {
    let old_status = task.status().clone();
    task.move_to(target.clone(), catalog, clock);
    AuditEntry::new(
        task.id(),
        old_status,
        target.clone(),
        actor_id.clone(),
        task.updated_at(),
    )
}
