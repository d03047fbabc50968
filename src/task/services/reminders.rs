//! Due-date reminder scanning.
//!
//! Scans are cooperative: each call reads the task list, evaluates due dates
//! against today's date and returns. A reminder for the same task, kind and
//! day is emitted at most once, so repeated ticks are harmless.

use crate::task::{
    domain::{StatusCatalog, Task, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Reminder scanning configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Tasks due within this many days (inclusive) get a due-soon reminder.
    pub due_soon_days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { due_soon_days: 1 }
    }
}

/// Kind of reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// The due date has passed.
    Overdue,
    /// The due date is close.
    DueSoon,
}

/// Reminder emitted by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Task the reminder is about.
    pub task_id: TaskId,
    /// Task title.
    pub title: String,
    /// Reminder kind.
    pub kind: ReminderKind,
    /// Task due date.
    pub due_date: NaiveDate,
    /// Users to notify.
    pub recipients: BTreeSet<UserId>,
}

type NotifiedKey = (TaskId, ReminderKind, NaiveDate);

/// Periodic overdue and due-soon scanner.
pub struct ReminderService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    catalog: Arc<StatusCatalog>,
    config: ReminderConfig,
    notified: Mutex<HashSet<NotifiedKey>>,
}

impl<R, C> ReminderService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a scanner with the default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, catalog: Arc<StatusCatalog>) -> Self {
        Self {
            repository,
            clock,
            catalog,
            config: ReminderConfig::default(),
            notified: Mutex::new(HashSet::new()),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub const fn with_config(mut self, config: ReminderConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs one scan and returns reminders not yet emitted today.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError`] when the task list cannot be read.
    pub async fn scan(&self) -> TaskRepositoryResult<Vec<Reminder>> {
        let tasks = self.repository.list().await?;
        let today = self.clock.utc().date_naive();

        let mut notified = self.notified.lock().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        notified.retain(|(_, _, day)| *day == today);

        let reminders: Vec<Reminder> = tasks
            .iter()
            .filter(|task| !self.catalog.is_final(task.status()))
            .filter_map(|task| self.evaluate(task, today))
            .filter(|reminder| notified.insert((reminder.task_id, reminder.kind, today)))
            .collect();

        debug!(scanned = tasks.len(), emitted = reminders.len(), %today, "reminder scan finished");
        Ok(reminders)
    }

    fn evaluate(&self, task: &Task, today: NaiveDate) -> Option<Reminder> {
        let due_date = task.due_date()?;
        let days_left = (due_date - today).num_days();
        let kind = if days_left < 0 {
            ReminderKind::Overdue
        } else if days_left <= i64::from(self.config.due_soon_days) {
            ReminderKind::DueSoon
        } else {
            return None;
        };
        Some(Reminder {
            task_id: task.id(),
            title: task.title().to_owned(),
            kind,
            due_date,
            recipients: recipients(task),
        })
    }
}

fn recipients(task: &Task) -> BTreeSet<UserId> {
    let mut recipients = task.collaborator_ids().clone();
    recipients.insert(task.assignee_id().unwrap_or(task.creator_id()).clone());
    recipients
}
