//! In-memory append-only audit log.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{AuditEntry, TaskId},
    ports::{AuditLog, AuditLogError, AuditLogResult},
};

/// Thread-safe in-memory audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every entry in append order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditLogError::Persistence`] when the lock is poisoned.
    pub fn all_entries(&self) -> AuditLogResult<Vec<AuditEntry>> {
        let entries = self.entries.read().map_err(|err| {
            AuditLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, new_entries: &[AuditEntry]) -> AuditLogResult<()> {
        let mut entries = self.entries.write().map_err(|err| {
            AuditLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        entries.extend_from_slice(new_entries);
        Ok(())
    }

    async fn entries_for(&self, task_id: TaskId) -> AuditLogResult<Vec<AuditEntry>> {
        let entries = self.entries.read().map_err(|err| {
            AuditLogError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(entries
            .iter()
            .filter(|entry| entry.task_id() == task_id)
            .cloned()
            .collect())
    }
}
