//! Given steps for task workflow BDD scenarios.

use super::world::{TaskWorkflowWorld, actor, run_async, user_id};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use workboard::task::{
    domain::ApprovalMode,
    services::{ChangeStatusRequest, CreateTaskRequest},
};

fn create(world: &mut TaskWorkflowWorld, request: CreateTaskRequest) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create_task(request))
        .wrap_err("create task for workflow scenario")?;
    world.tasks.push(created);
    Ok(())
}

#[given(r#"a task "{title}" assigned to "{assignee}""#)]
fn assigned_task(
    world: &mut TaskWorkflowWorld,
    title: String,
    assignee: String,
) -> Result<(), eyre::Report> {
    let request =
        CreateTaskRequest::new(title, user_id("owner")?).with_assignee(user_id(&assignee)?);
    create(world, request)
}

#[given(r#"a task "{title}" assigned to "{assignee}" with {count:usize} open subtasks"#)]
fn assigned_task_with_subtasks(
    world: &mut TaskWorkflowWorld,
    title: String,
    assignee: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title, user_id("owner")?)
        .with_assignee(user_id(&assignee)?)
        .with_subtasks((1..=count).map(|index| format!("step {index}")));
    create(world, request)
}

#[given(r#"the task is in "{status}""#)]
fn task_is_in(world: &mut TaskWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task_id()?;
    let request = ChangeStatusRequest::new(task_id, actor("admin")?, status).confirmed();
    run_async(world.service.change_status(request)).wrap_err("move task in scenario setup")?;
    Ok(())
}

#[given(r#"an approval task "{title}" in {mode} mode for "{first}" and "{second}""#)]
fn approval_task(
    world: &mut TaskWorkflowWorld,
    title: String,
    mode: String,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let approval_mode = ApprovalMode::try_from(mode.as_str())
        .map_err(|err| eyre::eyre!("invalid approval mode in scenario: {err}"))?;
    let request = CreateTaskRequest::new(title, user_id("owner")?)
        .with_approval(approval_mode, [user_id(&first)?, user_id(&second)?]);
    create(world, request)
}
