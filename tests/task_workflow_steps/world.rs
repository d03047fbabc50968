//! Shared world state for task workflow BDD scenarios.

use std::sync::Arc;

use workboard::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::{StatusChangeOutcome, Task, TaskId, User, UserId},
    services::{TaskWorkflowError, TaskWorkflowService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestWorkflowService =
    TaskWorkflowService<InMemoryTaskRepository, InMemoryAuditLog, DefaultClock>;

/// Scenario world for task workflow behaviour tests.
pub struct TaskWorkflowWorld {
    pub service: TestWorkflowService,
    pub tasks: Vec<Task>,
    pub last_outcome: Option<StatusChangeOutcome>,
    pub last_error: Option<TaskWorkflowError>,
}

impl TaskWorkflowWorld {
    /// Creates a world with no tasks.
    #[must_use]
    pub fn new() -> Self {
        let service = TaskWorkflowService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryAuditLog::new()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            tasks: Vec::new(),
            last_outcome: None,
            last_error: None,
        }
    }

    /// Returns the most recently created task's identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn current_task_id(&self) -> Result<TaskId, eyre::Report> {
        self.tasks
            .last()
            .map(Task::id)
            .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))
    }

    /// Records the result of a workflow call.
    pub fn record<T>(&mut self, result: Result<T, TaskWorkflowError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                self.last_error = Some(err);
                None
            }
        }
    }
}

impl Default for TaskWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorkflowWorld {
    TaskWorkflowWorld::default()
}

/// Parses a scenario user identifier.
///
/// # Errors
///
/// Returns an error when the identifier is blank.
pub fn user_id(raw: &str) -> Result<UserId, eyre::Report> {
    UserId::new(raw).map_err(|err| eyre::eyre!("invalid user in scenario: {err}"))
}

/// Builds a scenario member; the name `admin` yields an administrator.
///
/// # Errors
///
/// Returns an error when the name is blank.
pub fn actor(raw: &str) -> Result<User, eyre::Report> {
    let id = user_id(raw)?;
    Ok(if raw == "admin" {
        User::admin(id, raw)
    } else {
        User::member(id, raw)
    })
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
