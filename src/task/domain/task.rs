//! Task aggregate root and its owned subtasks.

use super::{
    Approval, PriorityCode, StatusCatalog, StatusCode, SubtaskId, TaskDomainError, TaskId, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Progress reported once a task reaches the done status.
pub const COMPLETE_PROGRESS: u8 = 100;

/// A unit of work owned by exactly one parent task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    id: SubtaskId,
    title: String,
    status: StatusCode,
}

impl Subtask {
    /// Creates a subtask in the given status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptySubtaskTitle`] when the title is blank.
    pub fn new(title: impl Into<String>, status: StatusCode) -> Result<Self, TaskDomainError> {
        let raw = title.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptySubtaskTitle);
        }
        Ok(Self {
            id: SubtaskId::new(),
            title: trimmed.to_owned(),
            status,
        })
    }

    /// Returns the subtask identifier.
    #[must_use]
    pub const fn id(&self) -> SubtaskId {
        self.id
    }

    /// Returns the subtask title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the subtask status.
    #[must_use]
    pub const fn status(&self) -> &StatusCode {
        &self.status
    }

    /// Returns whether the subtask is done or cancelled.
    #[must_use]
    pub fn is_terminal(&self, catalog: &StatusCatalog) -> bool {
        catalog.is_terminal(&self.status)
    }
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title; must not be blank.
    pub title: String,
    /// Initial status code.
    pub status: StatusCode,
    /// Priority code.
    pub priority: PriorityCode,
    /// Creating user.
    pub creator_id: UserId,
    /// Assigned user, if any.
    pub assignee_id: Option<UserId>,
    /// Collaborating users.
    pub collaborator_ids: BTreeSet<UserId>,
    /// Due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Initial subtasks.
    pub subtasks: Vec<Subtask>,
    /// Approval block for approval tasks.
    pub approval: Option<Approval>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    status: StatusCode,
    priority: PriorityCode,
    creator_id: UserId,
    assignee_id: Option<UserId>,
    collaborator_ids: BTreeSet<UserId>,
    due_date: Option<NaiveDate>,
    progress: u8,
    subtasks: Vec<Subtask>,
    approval: Option<Approval>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted status code.
    pub status: StatusCode,
    /// Persisted priority code.
    pub priority: PriorityCode,
    /// Persisted creator.
    pub creator_id: UserId,
    /// Persisted assignee.
    pub assignee_id: Option<UserId>,
    /// Persisted collaborators.
    pub collaborator_ids: BTreeSet<UserId>,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted progress percentage.
    pub progress: u8,
    /// Persisted subtasks.
    pub subtasks: Vec<Subtask>,
    /// Persisted approval block.
    pub approval: Option<Approval>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(data: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = normalize_title(&data.title)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title,
            status: data.status,
            priority: data.priority,
            creator_id: data.creator_id,
            assignee_id: data.assignee_id,
            collaborator_ids: data.collaborator_ids,
            due_date: data.due_date,
            progress: 0,
            subtasks: data.subtasks,
            approval: data.approval,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidProgress`] when the stored progress
    /// exceeds 100.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        if data.progress > COMPLETE_PROGRESS {
            return Err(TaskDomainError::InvalidProgress(data.progress));
        }
        Ok(Self {
            id: data.id,
            title: data.title,
            status: data.status,
            priority: data.priority,
            creator_id: data.creator_id,
            assignee_id: data.assignee_id,
            collaborator_ids: data.collaborator_ids,
            due_date: data.due_date,
            progress: data.progress,
            subtasks: data.subtasks,
            approval: data.approval,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the current status code.
    #[must_use]
    pub const fn status(&self) -> &StatusCode {
        &self.status
    }

    /// Returns the priority code.
    #[must_use]
    pub const fn priority(&self) -> &PriorityCode {
        &self.priority
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    /// Returns the collaborators.
    #[must_use]
    pub const fn collaborator_ids(&self) -> &BTreeSet<UserId> {
        &self.collaborator_ids
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns progress as a percentage.
    #[must_use]
    pub const fn progress(&self) -> u8 {
        self.progress
    }

    /// Returns the subtasks in order.
    #[must_use]
    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Returns the approval block for approval tasks.
    #[must_use]
    pub const fn approval(&self) -> Option<&Approval> {
        self.approval.as_ref()
    }

    /// Returns whether this is an approval task.
    #[must_use]
    pub const fn is_approval_task(&self) -> bool {
        self.approval.is_some()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Counts subtasks that are neither done nor cancelled.
    #[must_use]
    pub fn incomplete_subtasks(&self, catalog: &StatusCatalog) -> usize {
        self.subtasks
            .iter()
            .filter(|subtask| !subtask.is_terminal(catalog))
            .count()
    }

    /// Renames the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn rename(&mut self, title: &str, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.title = normalize_title(title)?;
        self.touch(clock);
        Ok(())
    }

    /// Changes the priority.
    pub fn set_priority(&mut self, priority: PriorityCode, clock: &impl Clock) {
        self.priority = priority;
        self.touch(clock);
    }

    /// Sets the status of one subtask.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::UnknownSubtask`] when the subtask does not
    /// belong to this task.
    pub fn set_subtask_status(
        &mut self,
        subtask_id: SubtaskId,
        status: StatusCode,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let task_id = self.id;
        let subtask = self
            .subtasks
            .iter_mut()
            .find(|subtask| subtask.id == subtask_id)
            .ok_or(TaskDomainError::UnknownSubtask {
                task_id,
                subtask_id,
            })?;
        subtask.status = status;
        self.touch(clock);
        Ok(())
    }

    /// Moves the task to `status` without consulting the transition rules.
    ///
    /// Reaching the catalog's done code completes progress.
    pub(crate) fn move_to(
        &mut self,
        status: StatusCode,
        catalog: &StatusCatalog,
        clock: &impl Clock,
    ) {
        if catalog.is_done(&status) {
            self.progress = COMPLETE_PROGRESS;
        }
        self.status = status;
        self.touch(clock);
    }

    pub(crate) const fn approval_mut(&mut self) -> Option<&mut Approval> {
        self.approval.as_mut()
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn normalize_title(title: &str) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
