//! Application services for task workflow orchestration.

mod reminders;
mod workflow;

pub use reminders::{Reminder, ReminderConfig, ReminderKind, ReminderService};
pub use workflow::{
    BulkStatusChangeRequest, ChangeStatusRequest, CreateTaskRequest, DeleteTasksRequest,
    RecordApprovalRequest, TaskWorkflowError, TaskWorkflowResult, TaskWorkflowService,
    UpdateSubtaskStatusRequest, UpdateTaskRequest,
};
