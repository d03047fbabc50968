//! In-memory adapters for task workflow tests and single-session use.

mod audit;
mod task;

pub use audit::InMemoryAuditLog;
pub use task::InMemoryTaskRepository;
