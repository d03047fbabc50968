//! Port contracts for task workflow management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod audit;
pub mod repository;
pub mod settings;

pub use audit::{AuditLog, AuditLogError, AuditLogResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use settings::{SettingsError, SettingsStore};
