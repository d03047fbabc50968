//! Then steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, run_async};
use rstest_bdd_macros::then;
use workboard::task::{
    domain::{StatusChangeOutcome, StatusCode, Task, WorkflowError},
    services::TaskWorkflowError,
};

fn stored_task(world: &TaskWorkflowWorld) -> Result<Task, eyre::Report> {
    let task_id = world.current_task_id()?;
    run_async(world.service.find_by_id(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} missing from repository"))
}

fn expected_status(raw: &str) -> Result<StatusCode, eyre::Report> {
    StatusCode::new(raw).map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = expected_status(&status)?;
    let task = stored_task(world)?;
    eyre::ensure!(
        task.status() == &expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then("the task progress is {progress:u8}")]
fn task_progress_is(world: &TaskWorkflowWorld, progress: u8) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    eyre::ensure!(
        task.progress() == progress,
        "expected progress {progress}, found {}",
        task.progress()
    );
    Ok(())
}

#[then("the audit trail length is {count:usize}")]
fn audit_trail_length(world: &TaskWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let trail = run_async(world.service.audit_trail(world.current_task_id()?))?;
    eyre::ensure!(
        trail.len() == count,
        "expected {count} audit entries, found {}",
        trail.len()
    );
    Ok(())
}

#[then(r#"confirmation is requested from "{from}" to "{to}""#)]
fn confirmation_requested(
    world: &TaskWorkflowWorld,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    match &world.last_outcome {
        Some(StatusChangeOutcome::PendingConfirmation(request)) => {
            eyre::ensure!(
                request.from_label == from && request.to_label == to,
                "expected {from} -> {to}, got {} -> {}",
                request.from_label,
                request.to_label
            );
            Ok(())
        }
        other => Err(eyre::eyre!("expected a confirmation request, got {other:?}")),
    }
}

#[then("the change is rejected with a {kind} error")]
fn change_rejected(world: &TaskWorkflowWorld, kind: String) -> Result<(), eyre::Report> {
    let Some(TaskWorkflowError::Workflow(err)) = &world.last_error else {
        return Err(eyre::eyre!(
            "expected a workflow error, got {:?}",
            world.last_error
        ));
    };
    let matches_kind = match kind.as_str() {
        "permission" => matches!(err, WorkflowError::PermissionDenied { .. }),
        "transition" => matches!(err, WorkflowError::InvalidTransition { .. }),
        "subtasks" => matches!(err, WorkflowError::IncompleteSubtasks { .. }),
        "turn" => matches!(err, WorkflowError::NotActionable(_)),
        "comment" => matches!(err, WorkflowError::CommentRequired),
        other => return Err(eyre::eyre!("unknown error kind in scenario: {other}")),
    };
    eyre::ensure!(matches_kind, "expected a {kind} error, got {err:?}");
    Ok(())
}

#[then(r#"the bulk change is rejected naming "{title}""#)]
fn bulk_rejected_naming(world: &TaskWorkflowWorld, title: String) -> Result<(), eyre::Report> {
    let Some(TaskWorkflowError::BulkRejected(violations)) = &world.last_error else {
        return Err(eyre::eyre!(
            "expected a bulk rejection, got {:?}",
            world.last_error
        ));
    };
    let titles: Vec<_> = violations.iter().map(|v| v.title.as_str()).collect();
    eyre::ensure!(titles == [title.as_str()], "unexpected violations: {titles:?}");
    Ok(())
}

#[then(r#"every task is still in "{status}""#)]
fn every_task_still_in(world: &TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = expected_status(&status)?;
    let tasks = run_async(world.service.list_tasks())?;
    eyre::ensure!(tasks.len() == world.tasks.len(), "task count changed");
    eyre::ensure!(
        tasks.iter().all(|task| task.status() == &expected),
        "some tasks left {expected}"
    );
    Ok(())
}
