//! In-memory task repository behaviour.

use super::helpers::{repo, todo_task, user_id};
use eyre::ensure;
use rstest::rstest;
use workboard::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{PriorityCode, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_duplicate_identifiers(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let task = todo_task("write docs")?;
    repo.store(&task).await?;

    let duplicate = repo.store(&task).await;
    ensure!(
        matches!(duplicate, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()),
        "expected duplicate error, got {duplicate:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_preserves_insertion_order(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    for title in ["first", "second", "third"] {
        repo.store(&todo_task(title)?).await?;
    }

    let titles: Vec<_> = repo
        .list()
        .await?
        .iter()
        .map(|task| task.title().to_owned())
        .collect();
    ensure!(titles == ["first", "second", "third"], "unexpected order {titles:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_many_is_all_or_nothing(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let mut stored = todo_task("stored")?;
    repo.store(&stored).await?;
    let missing = todo_task("never stored")?;

    let clock = mockable::DefaultClock;
    stored.set_priority(PriorityCode::new("urgent")?, &clock);
    let result = repo.update_many(&[stored.clone(), missing.clone()]).await;

    ensure!(
        matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == missing.id()),
        "expected not found, got {result:?}"
    );
    let reloaded = repo
        .find_by_id(stored.id())
        .await?
        .ok_or_else(|| eyre::eyre!("stored task vanished"))?;
    ensure!(
        reloaded.priority() == &PriorityCode::default(),
        "partial batch was written"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn remove_many_is_all_or_nothing(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let kept = todo_task("kept")?;
    repo.store(&kept).await?;

    let result = repo.remove_many(&[kept.id(), TaskId::new()]).await;
    ensure!(
        matches!(result, Err(TaskRepositoryError::NotFound(_))),
        "expected not found, got {result:?}"
    );
    ensure!(repo.find_by_id(kept.id()).await?.is_some(), "task removed");

    repo.remove_many(&[kept.id()]).await?;
    ensure!(repo.list().await?.is_empty(), "task not removed");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_replaces_stored_task(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let mut task = todo_task("draft")?;
    repo.store(&task).await?;
    task.rename("final draft", &mockable::DefaultClock)?;

    repo.update(&task).await?;

    let reloaded = repo
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    ensure!(reloaded.title() == "final draft", "title not updated");
    ensure!(reloaded.creator_id() == &user_id("owner"), "creator changed");
    Ok(())
}
