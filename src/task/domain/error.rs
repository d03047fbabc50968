//! Error types for task domain validation and workflow evaluation.

use super::{StatusCode, SubtaskId, TaskId, UserId};
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The subtask title is empty after trimming.
    #[error("subtask title must not be empty")]
    EmptySubtaskTitle,

    /// The user identifier is empty after trimming.
    #[error("user identifier must not be empty")]
    EmptyUserId,

    /// The status code is empty after trimming.
    #[error("status code must not be empty")]
    EmptyStatusCode,

    /// The priority code is empty after trimming.
    #[error("priority code must not be empty")]
    EmptyPriorityCode,

    /// The status label is empty after trimming.
    #[error("status label must not be empty for {0}")]
    EmptyStatusLabel(StatusCode),

    /// Two catalog entries share a code.
    #[error("duplicate status code in catalog: {0}")]
    DuplicateStatus(StatusCode),

    /// A catalog entry allows a transition to a code that is not defined.
    #[error("status {from} allows transition to undefined status {to}")]
    DanglingTransition {
        /// Status declaring the transition.
        from: StatusCode,
        /// Undefined target code.
        to: StatusCode,
    },

    /// More than one catalog entry is flagged as default.
    #[error("status catalog declares more than one default ({first} and {second})")]
    MultipleDefaults {
        /// First default encountered.
        first: StatusCode,
        /// Second default encountered.
        second: StatusCode,
    },

    /// A code is referenced that the catalog does not define.
    #[error("unknown status: {0}")]
    UnknownStatus(StatusCode),

    /// The catalog has no entry usable as the status of a new task.
    #[error("status catalog has no active default status")]
    NoDefaultStatus,

    /// An approval block was requested without approvers.
    #[error("approval tasks require at least one approver")]
    EmptyApprovers,

    /// The same approver appears more than once in an approval block.
    #[error("approver {0} is listed more than once")]
    DuplicateApprover(UserId),

    /// The progress value is outside `0..=100`.
    #[error("progress must be between 0 and 100, got {0}")]
    InvalidProgress(u8),

    /// The subtask is not owned by the task.
    #[error("subtask {subtask_id} not found on task {task_id}")]
    UnknownSubtask {
        /// Owning task.
        task_id: TaskId,
        /// Missing subtask.
        subtask_id: SubtaskId,
    },
}

/// Rejections produced by the workflow rules.
///
/// Every variant is recoverable: the caller reports it and performs no
/// mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// The acting user may not perform the operation on this task.
    #[error("user {user_id} is not permitted to modify task {task_id}")]
    PermissionDenied {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Acting user.
        user_id: UserId,
    },

    /// The requested status is not reachable from the current one.
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Current status code.
        from: StatusCode,
        /// Requested status code.
        to: StatusCode,
    },

    /// The task still has subtasks that are neither done nor cancelled.
    #[error("task {task_id} has {remaining} incomplete subtask(s)")]
    IncompleteSubtasks {
        /// Task the operation targeted.
        task_id: TaskId,
        /// Number of non-terminal subtasks.
        remaining: usize,
    },

    /// The task is not an approval task.
    #[error("task {0} is not an approval task")]
    NotAnApprovalTask(TaskId),

    /// The approver is not part of the approval list.
    #[error("user {0} is not an approver of this task")]
    UnknownApprover(UserId),

    /// The approver cannot act right now.
    #[error("approver {0} cannot act on this task yet or has already decided")]
    NotActionable(UserId),

    /// A rejection was submitted without an explanation.
    #[error("a comment is required when rejecting")]
    CommentRequired,
}

/// Error returned while parsing approval values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown approval value: {0}")]
pub struct ParseApprovalError(pub String);

/// Error returned while parsing user roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user role: {0}")]
pub struct ParseRoleError(pub String);
