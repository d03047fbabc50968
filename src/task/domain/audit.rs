//! Immutable audit records of task status changes.

use super::{StatusCode, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one status change.
///
/// Entries are append-only: the type exposes no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    task_id: TaskId,
    old_status: StatusCode,
    new_status: StatusCode,
    actor_id: UserId,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl AuditEntry {
    /// Creates an audit entry.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        old_status: StatusCode,
        new_status: StatusCode,
        actor_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            old_status,
            new_status,
            actor_id,
            timestamp,
            reason: None,
        }
    }

    /// Attaches a reason to the entry.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the task the entry belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the status before the change.
    #[must_use]
    pub const fn old_status(&self) -> &StatusCode {
        &self.old_status
    }

    /// Returns the status after the change.
    #[must_use]
    pub const fn new_status(&self) -> &StatusCode {
        &self.new_status
    }

    /// Returns who made the change.
    #[must_use]
    pub const fn actor_id(&self) -> &UserId {
        &self.actor_id
    }

    /// Returns when the change happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the reason, if one was recorded.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
