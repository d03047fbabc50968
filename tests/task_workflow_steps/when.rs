//! When steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, actor, run_async, user_id};
use rstest_bdd_macros::when;
use workboard::task::services::{
    BulkStatusChangeRequest, ChangeStatusRequest, RecordApprovalRequest,
};

fn change_status(
    world: &mut TaskWorkflowWorld,
    user: &str,
    status: String,
    confirmed: bool,
) -> Result<(), eyre::Report> {
    let task_id = world.current_task_id()?;
    let request = ChangeStatusRequest::new(task_id, actor(user)?, status);
    let request = if confirmed { request.confirmed() } else { request };
    let result = run_async(world.service.change_status(request));
    world.last_outcome = world.record(result);
    Ok(())
}

#[when(r#""{user}" moves the task to "{status}""#)]
fn moves_task(world: &mut TaskWorkflowWorld, user: String, status: String) -> Result<(), eyre::Report> {
    change_status(world, &user, status, false)
}

#[when(r#""{user}" confirms moving the task to "{status}""#)]
fn confirms_move(
    world: &mut TaskWorkflowWorld,
    user: String,
    status: String,
) -> Result<(), eyre::Report> {
    change_status(world, &user, status, true)
}

#[when(r#""{user}" moves all tasks to "{status}""#)]
fn moves_all_tasks(
    world: &mut TaskWorkflowWorld,
    user: String,
    status: String,
) -> Result<(), eyre::Report> {
    let ids: Vec<_> = world.tasks.iter().map(|task| task.id()).collect();
    let request = BulkStatusChangeRequest::new(ids, actor(&user)?, status);
    let result = run_async(world.service.bulk_change_status(request));
    world.record(result);
    Ok(())
}

#[when(r#""{approver}" approves the task"#)]
fn approves(world: &mut TaskWorkflowWorld, approver: String) -> Result<(), eyre::Report> {
    let request = RecordApprovalRequest::approve(world.current_task_id()?, user_id(&approver)?);
    let result = run_async(world.service.record_approval(request));
    world.record(result);
    Ok(())
}

#[when(r#""{approver}" rejects the task with comment "{comment}""#)]
fn rejects_with_comment(
    world: &mut TaskWorkflowWorld,
    approver: String,
    comment: String,
) -> Result<(), eyre::Report> {
    let request =
        RecordApprovalRequest::reject(world.current_task_id()?, user_id(&approver)?, comment);
    let result = run_async(world.service.record_approval(request));
    world.record(result);
    Ok(())
}

#[when(r#""{approver}" rejects the task without a comment"#)]
fn rejects_without_comment(
    world: &mut TaskWorkflowWorld,
    approver: String,
) -> Result<(), eyre::Report> {
    let request = RecordApprovalRequest::reject(world.current_task_id()?, user_id(&approver)?, "");
    let result = run_async(world.service.record_approval(request));
    world.record(result);
    Ok(())
}
