//! In-memory task repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    insertion_order: Vec<TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Fails with `NotFound` for the first id the state does not hold.
fn ensure_all_present<'a>(
    state: &InMemoryTaskState,
    mut ids: impl Iterator<Item = &'a TaskId>,
) -> TaskRepositoryResult<()> {
    match ids.find(|id| !state.tasks.contains_key(*id)) {
        Some(missing) => Err(TaskRepositoryError::NotFound(*missing)),
        None => Ok(()),
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.insertion_order.push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.update_many(std::slice::from_ref(task)).await
    }

    async fn update_many(&self, tasks: &[Task]) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let ids: Vec<TaskId> = tasks.iter().map(Task::id).collect();
        ensure_all_present(&state, ids.iter())?;
        for task in tasks {
            state.tasks.insert(task.id(), task.clone());
        }
        Ok(())
    }

    async fn remove_many(&self, ids: &[TaskId]) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        ensure_all_present(&state, ids.iter())?;
        for id in ids {
            state.tasks.remove(id);
        }
        state.insertion_order.retain(|id| !ids.contains(id));
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .insertion_order
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }
}
