//! Workflow executor: applies validated task changes through the repository
//! and records every status change in the audit log.

use crate::task::{
    domain::{
        Approval, ApprovalDecision, ApprovalMode, ApprovalStatus, AuditEntry, BulkViolation,
        DueDateSettings, NewTask, PriorityCode, StatusCatalog, StatusChangeOutcome, StatusCode,
        Subtask, SubtaskId, Task, TaskDomainError, TaskId, User, UserId, WorkflowError,
        apply_status_change, can_delete, can_edit, force_status, record_approval,
        valid_transitions, validate_bulk_delete, validate_bulk_status_change,
    },
    ports::{AuditLog, AuditLogError, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    creator_id: UserId,
    assignee_id: Option<UserId>,
    collaborator_ids: BTreeSet<UserId>,
    priority: Option<String>,
    due_date: Option<chrono::NaiveDate>,
    subtask_titles: Vec<String>,
    approval: Option<(ApprovalMode, Vec<UserId>)>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, creator_id: UserId) -> Self {
        Self {
            title: title.into(),
            creator_id,
            assignee_id: None,
            collaborator_ids: BTreeSet::new(),
            priority: None,
            due_date: None,
            subtask_titles: Vec::new(),
            approval: None,
        }
    }

    /// Sets the assignee.
    #[must_use]
    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets the collaborators.
    #[must_use]
    pub fn with_collaborators(mut self, collaborators: impl IntoIterator<Item = UserId>) -> Self {
        self.collaborator_ids = collaborators.into_iter().collect();
        self
    }

    /// Sets the priority code.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets an explicit due date instead of deriving one from the priority.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: chrono::NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Adds subtasks, created in the catalog's default status.
    #[must_use]
    pub fn with_subtasks(mut self, titles: impl IntoIterator<Item = String>) -> Self {
        self.subtask_titles = titles.into_iter().collect();
        self
    }

    /// Makes the task an approval task.
    #[must_use]
    pub fn with_approval(
        mut self,
        mode: ApprovalMode,
        approvers: impl IntoIterator<Item = UserId>,
    ) -> Self {
        self.approval = Some((mode, approvers.into_iter().collect()));
        self
    }
}

/// Request payload for changing a task's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeStatusRequest {
    task_id: TaskId,
    actor: User,
    target_status: String,
    require_confirmation: bool,
}

impl ChangeStatusRequest {
    /// Creates a request that asks for confirmation before final statuses.
    #[must_use]
    pub fn new(task_id: TaskId, actor: User, target_status: impl Into<String>) -> Self {
        Self {
            task_id,
            actor,
            target_status: target_status.into(),
            require_confirmation: true,
        }
    }

    /// Marks the change as already confirmed by the user.
    #[must_use]
    pub const fn confirmed(mut self) -> Self {
        self.require_confirmation = false;
        self
    }
}

/// Request payload for editing task details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    actor: User,
    title: Option<String>,
    priority: Option<String>,
}

impl UpdateTaskRequest {
    /// Creates an empty edit.
    #[must_use]
    pub const fn new(task_id: TaskId, actor: User) -> Self {
        Self {
            task_id,
            actor,
            title: None,
            priority: None,
        }
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new priority code.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

/// Request payload for changing a subtask's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSubtaskStatusRequest {
    task_id: TaskId,
    subtask_id: SubtaskId,
    actor: User,
    status: String,
}

impl UpdateSubtaskStatusRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        subtask_id: SubtaskId,
        actor: User,
        status: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            subtask_id,
            actor,
            status: status.into(),
        }
    }
}

/// Request payload for an approver's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordApprovalRequest {
    task_id: TaskId,
    approver_id: UserId,
    decision: ApprovalDecision,
    comment: Option<String>,
}

impl RecordApprovalRequest {
    /// Creates an approval.
    #[must_use]
    pub const fn approve(task_id: TaskId, approver_id: UserId) -> Self {
        Self {
            task_id,
            approver_id,
            decision: ApprovalDecision::Approve,
            comment: None,
        }
    }

    /// Creates a rejection. A non-blank comment is required.
    #[must_use]
    pub fn reject(task_id: TaskId, approver_id: UserId, comment: impl Into<String>) -> Self {
        Self {
            task_id,
            approver_id,
            decision: ApprovalDecision::Reject,
            comment: Some(comment.into()),
        }
    }

    /// Attaches a comment to the decision.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Request payload for moving several tasks to one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkStatusChangeRequest {
    task_ids: Vec<TaskId>,
    actor: User,
    target_status: String,
}

impl BulkStatusChangeRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        task_ids: impl IntoIterator<Item = TaskId>,
        actor: User,
        target_status: impl Into<String>,
    ) -> Self {
        Self {
            task_ids: task_ids.into_iter().collect(),
            actor,
            target_status: target_status.into(),
        }
    }
}

/// Request payload for deleting one or more tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTasksRequest {
    task_ids: Vec<TaskId>,
    actor: User,
    cascade_subtasks: bool,
}

impl DeleteTasksRequest {
    /// Creates a request that refuses to delete tasks owning subtasks.
    #[must_use]
    pub fn new(task_ids: impl IntoIterator<Item = TaskId>, actor: User) -> Self {
        Self {
            task_ids: task_ids.into_iter().collect(),
            actor,
            cascade_subtasks: false,
        }
    }

    /// Allows deleting tasks together with their subtasks.
    #[must_use]
    pub const fn cascading(mut self) -> Self {
        self.cascade_subtasks = true;
        self
    }
}

/// Service-level errors for task workflow operations.
#[derive(Debug, Error)]
pub enum TaskWorkflowError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// A workflow rule rejected the operation.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Audit log operation failed.
    #[error(transparent)]
    Audit(#[from] AuditLogError),
    /// One or more tasks block a bulk operation; nothing was changed.
    #[error("bulk operation rejected for {} task(s)", .0.len())]
    BulkRejected(Vec<BulkViolation>),
    /// Deleting the task would orphan subtasks and cascading was not
    /// requested.
    #[error("task {task_id} owns {count} subtask(s); cascade deletion was not requested")]
    SubtasksPresent {
        /// Task that owns subtasks.
        task_id: TaskId,
        /// Number of owned subtasks.
        count: usize,
    },
}

/// Result type for task workflow service operations.
pub type TaskWorkflowResult<T> = Result<T, TaskWorkflowError>;

/// Task workflow orchestration service.
#[derive(Clone)]
pub struct TaskWorkflowService<R, A, C>
where
    R: TaskRepository,
    A: AuditLog,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audit_log: Arc<A>,
    clock: Arc<C>,
    catalog: Arc<StatusCatalog>,
    due_dates: DueDateSettings,
}

impl<R, A, C> TaskWorkflowService<R, A, C>
where
    R: TaskRepository,
    A: AuditLog,
    C: Clock + Send + Sync,
{
    /// Creates a service using the stock status catalog and due-date table.
    #[must_use]
    pub fn new(repository: Arc<R>, audit_log: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            audit_log,
            clock,
            catalog: Arc::new(StatusCatalog::default()),
            due_dates: DueDateSettings::default(),
        }
    }

    /// Replaces the status catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<StatusCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the due-date settings.
    #[must_use]
    pub fn with_due_date_settings(mut self, due_dates: DueDateSettings) -> Self {
        self.due_dates = due_dates;
        self
    }

    /// Returns the status catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &StatusCatalog {
        &self.catalog
    }

    /// Creates and stores a new task in the catalog's default status.
    ///
    /// Without an explicit due date the date is derived from the priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Domain`] when input validation fails or
    /// [`TaskWorkflowError::Repository`] when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskWorkflowResult<Task> {
        let CreateTaskRequest {
            title,
            creator_id,
            assignee_id,
            collaborator_ids,
            priority,
            due_date,
            subtask_titles,
            approval,
        } = request;

        let initial_status = self
            .catalog
            .default_status()
            .ok_or(TaskDomainError::NoDefaultStatus)?
            .code()
            .clone();
        let priority_code = match priority {
            Some(code) => PriorityCode::new(code)?,
            None => PriorityCode::default(),
        };
        let resolved_due_date = due_date.or_else(|| {
            self.due_dates
                .due_date_for(&priority_code, self.clock.utc().date_naive())
        });
        let subtasks = subtask_titles
            .into_iter()
            .map(|subtask_title| Subtask::new(subtask_title, initial_status.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let approval_block = approval
            .map(|(mode, approvers)| Approval::new(mode, approvers))
            .transpose()?;

        let task = Task::new(
            NewTask {
                title,
                status: initial_status,
                priority: priority_code,
                creator_id,
                assignee_id,
                collaborator_ids,
                due_date: resolved_due_date,
                subtasks,
                approval: approval_block,
            },
            &*self.clock,
        )?;
        self.repository.store(&task).await?;
        info!(task_id = %task.id(), status = %task.status(), "task created");
        Ok(task)
    }

    /// Finds a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskWorkflowResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Returns all tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_tasks(&self) -> TaskWorkflowResult<Vec<Task>> {
        Ok(self.repository.list().await?)
    }

    /// Returns the statuses the task may move to next.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Repository`] when the task is missing or
    /// lookup fails.
    pub async fn available_transitions(
        &self,
        task_id: TaskId,
    ) -> TaskWorkflowResult<Vec<StatusCode>> {
        let task = self.find_by_id_or_error(task_id).await?;
        Ok(valid_transitions(&task, &self.catalog))
    }

    /// Changes a task's status.
    ///
    /// Final targets return [`StatusChangeOutcome::PendingConfirmation`]
    /// unless the request was marked confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Workflow`] when a rule rejects the change,
    /// [`TaskWorkflowError::Domain`] for a malformed status, and repository or
    /// audit errors when persistence fails.
    pub async fn change_status(
        &self,
        request: ChangeStatusRequest,
    ) -> TaskWorkflowResult<StatusChangeOutcome> {
        let target = StatusCode::new(&request.target_status)?;
        let mut task = self.find_by_id_or_error(request.task_id).await?;

        let outcome = apply_status_change(
            &mut task,
            &target,
            &self.catalog,
            &request.actor,
            request.require_confirmation,
            &*self.clock,
        )?;

        match &outcome {
            StatusChangeOutcome::Applied(entry) => {
                self.repository.update(&task).await?;
                self.audit_log.append(std::slice::from_ref(entry)).await?;
                info!(
                    task_id = %task.id(),
                    from = %entry.old_status(),
                    to = %entry.new_status(),
                    actor = %entry.actor_id(),
                    "task status changed"
                );
            }
            StatusChangeOutcome::PendingConfirmation(pending) => {
                debug!(task_id = %pending.task_id, to = %pending.to, "status change awaits confirmation");
            }
        }
        Ok(outcome)
    }

    /// Edits a task's title and priority.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Workflow`] when the actor may not edit the
    /// task, [`TaskWorkflowError::Domain`] for invalid values, and repository
    /// errors when persistence fails.
    pub async fn update_details(&self, request: UpdateTaskRequest) -> TaskWorkflowResult<Task> {
        let mut task = self.find_by_id_or_error(request.task_id).await?;
        ensure_can_edit(&task, &request.actor)?;

        let priority = request.priority.map(PriorityCode::new).transpose()?;
        if let Some(title) = request.title.as_deref() {
            task.rename(title, &*self.clock)?;
        }
        if let Some(code) = priority {
            task.set_priority(code, &*self.clock);
        }
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Sets the status of one subtask to an active catalog status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Workflow`] when the actor may not edit the
    /// task, [`TaskWorkflowError::Domain`] for unknown statuses or subtasks,
    /// and repository errors when persistence fails.
    pub async fn update_subtask_status(
        &self,
        request: UpdateSubtaskStatusRequest,
    ) -> TaskWorkflowResult<Task> {
        let status = StatusCode::new(&request.status)?;
        let mut task = self.find_by_id_or_error(request.task_id).await?;
        ensure_can_edit(&task, &request.actor)?;
        if self.catalog.find_active(&status).is_none() {
            return Err(TaskDomainError::UnknownStatus(status).into());
        }
        task.set_subtask_status(request.subtask_id, status, &*self.clock)?;
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Records an approver's decision.
    ///
    /// When the aggregate outcome becomes approved the task moves to the
    /// catalog's done status; when it becomes rejected the task moves to the
    /// cancelled status. Either move is audited.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Workflow`] when the approver cannot act, a
    /// rejection lacks a comment, or an approval would complete a task whose
    /// subtasks are still open. Nothing is stored in those cases. Repository
    /// or audit errors are returned when persistence fails.
    pub async fn record_approval(&self, request: RecordApprovalRequest) -> TaskWorkflowResult<Task> {
        let mut task = self.find_by_id_or_error(request.task_id).await?;
        let aggregate = record_approval(
            &mut task,
            &request.approver_id,
            request.decision,
            request.comment.as_deref(),
            &*self.clock,
        )?;

        if aggregate == ApprovalStatus::Approved {
            let remaining = task.incomplete_subtasks(&self.catalog);
            if remaining > 0 {
                return Err(WorkflowError::IncompleteSubtasks {
                    task_id: task.id(),
                    remaining,
                }
                .into());
            }
        }

        let resolution = match aggregate {
            ApprovalStatus::Approved => Some((self.catalog.done_code().clone(), "approved")),
            ApprovalStatus::Rejected => Some((self.catalog.cancelled_code().clone(), "rejected")),
            ApprovalStatus::Pending | ApprovalStatus::Waiting => None,
        };
        let entry = resolution
            .filter(|(target, _)| task.status() != target)
            .map(|(target, outcome)| {
                force_status(
                    &mut task,
                    &target,
                    &self.catalog,
                    &request.approver_id,
                    &*self.clock,
                )
                .with_reason(format!("approval {outcome}"))
            });

        self.repository.update(&task).await?;
        if let Some(audit_entry) = entry {
            self.audit_log
                .append(std::slice::from_ref(&audit_entry))
                .await?;
            info!(
                task_id = %task.id(),
                to = %audit_entry.new_status(),
                approver = %request.approver_id,
                "approval resolved"
            );
        }
        Ok(task)
    }

    /// Moves every listed task to one status, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::BulkRejected`] with every violation when
    /// any task blocks the batch, [`TaskWorkflowError::Domain`] when the
    /// target is not an active status, and repository or audit errors when
    /// persistence fails.
    pub async fn bulk_change_status(
        &self,
        request: BulkStatusChangeRequest,
    ) -> TaskWorkflowResult<Vec<Task>> {
        let target = StatusCode::new(&request.target_status)?;
        if self.catalog.find_active(&target).is_none() {
            return Err(TaskDomainError::UnknownStatus(target).into());
        }
        let mut tasks = self.load_all(&request.task_ids).await?;

        let violations =
            validate_bulk_status_change(&tasks, &target, &self.catalog, &request.actor);
        if !violations.is_empty() {
            warn!(
                target = %target,
                rejected = violations.len(),
                requested = tasks.len(),
                "bulk status change rejected"
            );
            return Err(TaskWorkflowError::BulkRejected(violations));
        }

        let entries: Vec<AuditEntry> = tasks
            .iter_mut()
            .filter(|task| task.status() != &target)
            .map(|task| {
                force_status(
                    task,
                    &target,
                    &self.catalog,
                    request.actor.id(),
                    &*self.clock,
                )
            })
            .collect();
        self.repository.update_many(&tasks).await?;
        self.audit_log.append(&entries).await?;
        info!(target = %target, changed = entries.len(), "bulk status change applied");
        Ok(tasks)
    }

    /// Deletes every listed task, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Workflow`] when a single task may not be
    /// deleted, [`TaskWorkflowError::BulkRejected`] with every violation for
    /// larger batches, [`TaskWorkflowError::SubtasksPresent`] when a task owns
    /// subtasks and cascading was not requested, and repository errors when
    /// persistence fails.
    pub async fn delete_tasks(&self, request: DeleteTasksRequest) -> TaskWorkflowResult<()> {
        let tasks = self.load_all(&request.task_ids).await?;

        let mut violations = validate_bulk_delete(&tasks, &request.actor);
        if violations.len() == 1 && tasks.len() == 1 {
            if let Some(violation) = violations.pop() {
                return Err(violation.error.into());
            }
        }
        if !violations.is_empty() {
            warn!(rejected = violations.len(), "bulk delete rejected");
            return Err(TaskWorkflowError::BulkRejected(violations));
        }

        if !request.cascade_subtasks {
            if let Some(owner) = tasks.iter().find(|task| !task.subtasks().is_empty()) {
                return Err(TaskWorkflowError::SubtasksPresent {
                    task_id: owner.id(),
                    count: owner.subtasks().len(),
                });
            }
        }

        let ids: Vec<TaskId> = tasks.iter().map(Task::id).collect();
        self.repository.remove_many(&ids).await?;
        info!(deleted = tasks.len(), actor = %request.actor.id(), "tasks deleted");
        Ok(())
    }

    /// Returns whether `actor` may delete the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Repository`] when the task is missing or
    /// lookup fails.
    pub async fn can_delete(&self, task_id: TaskId, actor: &User) -> TaskWorkflowResult<bool> {
        let task = self.find_by_id_or_error(task_id).await?;
        Ok(can_delete(&task, actor))
    }

    /// Returns the task's audit entries in append order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskWorkflowError::Audit`] when the log cannot be read.
    pub async fn audit_trail(&self, task_id: TaskId) -> TaskWorkflowResult<Vec<AuditEntry>> {
        Ok(self.audit_log.entries_for(task_id).await?)
    }

    async fn find_by_id_or_error(&self, id: TaskId) -> TaskWorkflowResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| TaskRepositoryError::NotFound(id).into())
    }

    /// Loads each distinct task once, in request order.
    async fn load_all(&self, ids: &[TaskId]) -> TaskWorkflowResult<Vec<Task>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids.iter().filter(|id| seen.insert(**id)) {
            tasks.push(self.find_by_id_or_error(*id).await?);
        }
        Ok(tasks)
    }
}

fn ensure_can_edit(task: &Task, actor: &User) -> Result<(), WorkflowError> {
    if can_edit(task, actor) {
        Ok(())
    } else {
        Err(WorkflowError::PermissionDenied {
            task_id: task.id(),
            user_id: actor.id().clone(),
        })
    }
}
