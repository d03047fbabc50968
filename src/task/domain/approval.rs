//! Approval evaluation for tasks that require sign-off from one or more
//! approvers.

use super::{ParseApprovalError, Task, TaskDomainError, UserId, WorkflowError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// How approver decisions combine into one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// One approval is enough.
    Any,
    /// Every approver must approve.
    All,
    /// Approvers decide one after another in list order.
    Sequential,
}

impl ApprovalMode {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
            Self::Sequential => "sequential",
        }
    }
}

impl TryFrom<&str> for ApprovalMode {
    type Error = ParseApprovalError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            "sequential" => Ok(Self::Sequential),
            _ => Err(ParseApprovalError(value.to_owned())),
        }
    }
}

impl fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single approver, and of an approval as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
    /// Not yet eligible to decide.
    Waiting,
}

impl ApprovalStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Waiting => "waiting",
        }
    }
}

impl TryFrom<&str> for ApprovalStatus {
    type Error = ParseApprovalError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "waiting" => Ok(Self::Waiting),
            _ => Err(ParseApprovalError(value.to_owned())),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision an approver submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Approve the task.
    Approve,
    /// Reject the task. Requires a comment.
    Reject,
}

impl ApprovalDecision {
    const fn resulting_status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// One approver of an approval task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    user_id: UserId,
    status: ApprovalStatus,
    comment: Option<String>,
    decided_at: Option<DateTime<Utc>>,
}

impl Approver {
    /// Creates an undecided approver with the given starting status.
    #[must_use]
    pub const fn new(user_id: UserId, status: ApprovalStatus) -> Self {
        Self {
            user_id,
            status,
            comment: None,
            decided_at: None,
        }
    }

    /// Returns the approver's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the approver's status.
    #[must_use]
    pub const fn status(&self) -> ApprovalStatus {
        self.status
    }

    /// Returns the comment left with the decision.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns when the approver decided.
    #[must_use]
    pub const fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }
}

/// Computes the aggregate status of a list of approvers under `mode`.
///
/// An empty list is never approved: it evaluates to `Waiting` under
/// [`ApprovalMode::Any`] and `Pending` otherwise.
#[must_use]
pub fn approval_status(mode: ApprovalMode, approvers: &[Approver]) -> ApprovalStatus {
    let has = |status: ApprovalStatus| approvers.iter().any(|a| a.status() == status);
    let all_approved =
        !approvers.is_empty() && approvers.iter().all(|a| a.status() == ApprovalStatus::Approved);

    if mode != ApprovalMode::Any && has(ApprovalStatus::Rejected) {
        return ApprovalStatus::Rejected;
    }

    match mode {
        ApprovalMode::Any => {
            if has(ApprovalStatus::Approved) {
                ApprovalStatus::Approved
            } else if has(ApprovalStatus::Pending) {
                ApprovalStatus::Pending
            } else {
                ApprovalStatus::Waiting
            }
        }
        ApprovalMode::All | ApprovalMode::Sequential => {
            if all_approved {
                ApprovalStatus::Approved
            } else {
                ApprovalStatus::Pending
            }
        }
    }
}

/// Approval block attached to an approval task.
///
/// Deserialisation goes through [`Approval::from_approvers`], so a stored
/// block can never have an empty approver list and its aggregate status is
/// always recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredApproval")]
pub struct Approval {
    mode: ApprovalMode,
    approvers: Vec<Approver>,
    status: ApprovalStatus,
}

impl Approval {
    /// Creates an approval block for the given approvers.
    ///
    /// Under [`ApprovalMode::Sequential`] only the first approver starts as
    /// `Pending`; the rest wait their turn.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyApprovers`] for an empty list or
    /// [`TaskDomainError::DuplicateApprover`] when an approver repeats.
    pub fn new(
        mode: ApprovalMode,
        approver_ids: impl IntoIterator<Item = UserId>,
    ) -> Result<Self, TaskDomainError> {
        let mut seen = HashSet::new();
        let mut approvers = Vec::new();
        for user_id in approver_ids {
            if !seen.insert(user_id.clone()) {
                return Err(TaskDomainError::DuplicateApprover(user_id));
            }
            let starting = if mode == ApprovalMode::Sequential && !approvers.is_empty() {
                ApprovalStatus::Waiting
            } else {
                ApprovalStatus::Pending
            };
            approvers.push(Approver::new(user_id, starting));
        }
        Self::from_approvers(mode, approvers)
    }

    /// Rebuilds an approval block from stored approvers, recomputing the
    /// aggregate status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyApprovers`] for an empty list.
    pub fn from_approvers(
        mode: ApprovalMode,
        approvers: Vec<Approver>,
    ) -> Result<Self, TaskDomainError> {
        if approvers.is_empty() {
            return Err(TaskDomainError::EmptyApprovers);
        }
        let status = approval_status(mode, &approvers);
        Ok(Self {
            mode,
            approvers,
            status,
        })
    }

    /// Returns the approval mode.
    #[must_use]
    pub const fn mode(&self) -> ApprovalMode {
        self.mode
    }

    /// Returns the approvers in decision order.
    #[must_use]
    pub fn approvers(&self) -> &[Approver] {
        &self.approvers
    }

    /// Returns the stored aggregate status.
    #[must_use]
    pub const fn status(&self) -> ApprovalStatus {
        self.status
    }

    /// Returns the approver entry for `approver_id`.
    #[must_use]
    pub fn approver(&self, approver_id: &UserId) -> Option<&Approver> {
        self.approvers.iter().find(|a| a.user_id() == approver_id)
    }

    /// Returns whether `approver_id` may decide right now.
    ///
    /// The approver must be `Pending`; under sequential mode every earlier
    /// approver must also have approved.
    #[must_use]
    pub fn can_approver_act(&self, approver_id: &UserId) -> bool {
        let Some(position) = self.position_of(approver_id) else {
            return false;
        };
        let pending = self
            .approvers
            .get(position)
            .is_some_and(|a| a.status() == ApprovalStatus::Pending);
        if !pending {
            return false;
        }
        match self.mode {
            ApprovalMode::Sequential => self
                .approvers
                .iter()
                .take(position)
                .all(|a| a.status() == ApprovalStatus::Approved),
            ApprovalMode::Any | ApprovalMode::All => true,
        }
    }

    /// Records a decision and returns the new aggregate status.
    ///
    /// Under sequential mode an approval hands the turn to the next waiting
    /// approver. A rejection leaves the remaining approvers as they are.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownApprover`],
    /// [`WorkflowError::NotActionable`] or [`WorkflowError::CommentRequired`].
    /// The block is unchanged on error.
    pub fn record_decision(
        &mut self,
        approver_id: &UserId,
        decision: ApprovalDecision,
        comment: Option<&str>,
        clock: &impl Clock,
    ) -> Result<ApprovalStatus, WorkflowError> {
        let position = self
            .position_of(approver_id)
            .ok_or_else(|| WorkflowError::UnknownApprover(approver_id.clone()))?;
        if !self.can_approver_act(approver_id) {
            return Err(WorkflowError::NotActionable(approver_id.clone()));
        }
        let trimmed_comment = comment.map(str::trim).filter(|c| !c.is_empty());
        if decision == ApprovalDecision::Reject && trimmed_comment.is_none() {
            return Err(WorkflowError::CommentRequired);
        }

        if let Some(approver) = self.approvers.get_mut(position) {
            approver.status = decision.resulting_status();
            approver.comment = trimmed_comment.map(str::to_owned);
            approver.decided_at = Some(clock.utc());
        }

        if self.mode == ApprovalMode::Sequential && decision == ApprovalDecision::Approve {
            if let Some(next) = self
                .approvers
                .iter_mut()
                .skip(position + 1)
                .find(|a| a.status() == ApprovalStatus::Waiting)
            {
                next.status = ApprovalStatus::Pending;
            }
        }

        self.status = approval_status(self.mode, &self.approvers);
        Ok(self.status)
    }

    fn position_of(&self, approver_id: &UserId) -> Option<usize> {
        self.approvers
            .iter()
            .position(|a| a.user_id() == approver_id)
    }
}

#[derive(Deserialize)]
struct StoredApproval {
    mode: ApprovalMode,
    approvers: Vec<Approver>,
}

impl TryFrom<StoredApproval> for Approval {
    type Error = TaskDomainError;

    fn try_from(stored: StoredApproval) -> Result<Self, Self::Error> {
        Self::from_approvers(stored.mode, stored.approvers)
    }
}

/// Records `approver_id`'s decision on an approval task and returns the new
/// aggregate status.
///
/// Mapping the aggregate onto the task status is left to the caller.
///
/// # Errors
///
/// Returns [`WorkflowError::NotAnApprovalTask`] for ordinary tasks, and the
/// errors of [`Approval::record_decision`] otherwise.
pub fn record_approval(
    task: &mut Task,
    approver_id: &UserId,
    decision: ApprovalDecision,
    comment: Option<&str>,
    clock: &impl Clock,
) -> Result<ApprovalStatus, WorkflowError> {
    let task_id = task.id();
    let approval = task
        .approval_mut()
        .ok_or(WorkflowError::NotAnApprovalTask(task_id))?;
    approval.record_decision(approver_id, decision, comment, clock)
}
