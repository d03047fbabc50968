//! Append-only audit log port.

use crate::task::domain::{AuditEntry, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit log operations.
pub type AuditLogResult<T> = Result<T, AuditLogError>;

/// Append-only store of status change records.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends entries in order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Persistence`] when the log cannot be written.
    async fn append(&self, entries: &[AuditEntry]) -> AuditLogResult<()>;

    /// Returns the entries for `task_id` in append order.
    async fn entries_for(&self, task_id: TaskId) -> AuditLogResult<Vec<AuditEntry>>;
}

/// Errors returned by audit log implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditLogError {
    /// Persistence-layer failure.
    #[error("audit persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditLogError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
