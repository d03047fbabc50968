//! Shared test helpers for in-memory integration tests.

use std::collections::BTreeSet;

use mockable::DefaultClock;
use rstest::fixture;
use workboard::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::{NewTask, PriorityCode, StatusCode, Task, User, UserId},
};

/// Provides a fresh in-memory repository for each test.
#[fixture]
pub fn repo() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

/// Provides a fresh audit log for each test.
#[fixture]
pub fn audit_log() -> InMemoryAuditLog {
    InMemoryAuditLog::new()
}

/// Parses a user identifier, panicking on blank input.
pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

/// Builds a member user named after its identifier.
pub fn member(raw: &str) -> User {
    User::member(user_id(raw), raw)
}

/// Parses a status code, panicking on blank input.
pub fn status(raw: &str) -> StatusCode {
    StatusCode::new(raw).expect("valid status code")
}

/// Builds a plain `TODO` task with the given title.
///
/// # Errors
///
/// Returns an error if the title is blank.
pub fn todo_task(title: &str) -> Result<Task, eyre::Report> {
    Ok(Task::new(
        NewTask {
            title: title.to_owned(),
            status: status("TODO"),
            priority: PriorityCode::default(),
            creator_id: user_id("owner"),
            assignee_id: None,
            collaborator_ids: BTreeSet::new(),
            due_date: None,
            subtasks: Vec::new(),
            approval: None,
        },
        &DefaultClock,
    )?)
}
