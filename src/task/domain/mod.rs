//! Domain model for task lifecycle and approval workflows.
//!
//! The domain holds the status catalog, permission predicates, transition
//! validation, approval evaluation and bulk validation. Everything here is
//! synchronous and free of infrastructure concerns.

mod approval;
mod audit;
mod bulk;
mod error;
mod ids;
mod permission;
mod priority;
mod status;
mod task;
mod transition;
mod user;

pub use approval::{
    Approval, ApprovalDecision, ApprovalMode, ApprovalStatus, Approver, approval_status,
    record_approval,
};
pub use audit::AuditEntry;
pub use bulk::{BulkViolation, validate_bulk_delete, validate_bulk_status_change};
pub use error::{ParseApprovalError, ParseRoleError, TaskDomainError, WorkflowError};
pub use ids::{SubtaskId, TaskId, UserId};
pub use permission::{can_delete, can_edit};
pub use priority::{DueDateSettings, PriorityCode};
pub use status::{StatusCatalog, StatusCode, StatusDefinition};
pub use task::{COMPLETE_PROGRESS, NewTask, PersistedTaskData, Subtask, Task};
pub use transition::{
    ConfirmationRequest, StatusChangeOutcome, apply_status_change, valid_transitions,
};
pub use user::{Role, User};

pub(crate) use transition::force_status;
