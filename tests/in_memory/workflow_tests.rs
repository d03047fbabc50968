//! End-to-end workflow service tests over the in-memory adapters.

use std::sync::Arc;

use super::helpers::{member, status, user_id};
use chrono::Utc;
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use workboard::task::{
    adapters::memory::{InMemoryAuditLog, InMemoryTaskRepository},
    domain::{DueDateSettings, PriorityCode, StatusCatalog, StatusChangeOutcome, StatusDefinition},
    services::{
        ChangeStatusRequest, CreateTaskRequest, DeleteTasksRequest, ReminderService,
        TaskWorkflowError, TaskWorkflowService,
    },
};

type TestService = TaskWorkflowService<InMemoryTaskRepository, InMemoryAuditLog, DefaultClock>;

struct Setup {
    repository: Arc<InMemoryTaskRepository>,
    service: TestService,
}

#[fixture]
fn setup() -> Setup {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let service = TaskWorkflowService::new(
        Arc::clone(&repository),
        Arc::new(InMemoryAuditLog::new()),
        Arc::new(DefaultClock),
    );
    Setup {
        repository,
        service,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_is_audited_in_order(setup: Setup) -> eyre::Result<()> {
    let service = setup.service;
    let task = service
        .create_task(CreateTaskRequest::new("Quarterly report", user_id("alice")))
        .await?;

    for target in ["INPROGRESS", "REVIEW", "DONE"] {
        let outcome = service
            .change_status(ChangeStatusRequest::new(task.id(), member("alice"), target).confirmed())
            .await?;
        ensure!(
            matches!(outcome, StatusChangeOutcome::Applied(_)),
            "expected {target} to apply"
        );
    }

    let trail = service.audit_trail(task.id()).await?;
    let targets: Vec<_> = trail.iter().map(|e| e.new_status().as_str()).collect();
    ensure!(
        targets == ["INPROGRESS", "REVIEW", "DONE"],
        "unexpected trail {targets:?}"
    );
    ensure!(
        service.available_transitions(task.id()).await?.is_empty(),
        "done tasks have no way out"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn custom_catalog_drives_transitions(setup: Setup) -> eyre::Result<()> {
    let catalog = StatusCatalog::new(vec![
        StatusDefinition::new("OPEN", "Open")?
            .default_status()
            .with_transitions(["DONE", "CANCELLED"])?,
        StatusDefinition::new("DONE", "Closed")?.final_status(),
        StatusDefinition::new("CANCELLED", "Dropped")?.final_status(),
    ])?;
    let service = setup.service.with_catalog(Arc::new(catalog));

    let task = service
        .create_task(CreateTaskRequest::new("Triage", user_id("alice")))
        .await?;
    ensure!(task.status() == &status("OPEN"), "default status not used");

    let outcome = service
        .change_status(ChangeStatusRequest::new(task.id(), member("alice"), "done"))
        .await?;
    let StatusChangeOutcome::PendingConfirmation(request) = outcome else {
        return Err(eyre::eyre!("expected confirmation request"));
    };
    ensure!(request.to_label == "Closed", "label not taken from catalog");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn due_dates_follow_loaded_settings(setup: Setup) -> eyre::Result<()> {
    let settings =
        DueDateSettings::default().with_days(PriorityCode::new(PriorityCode::URGENT)?, 0);
    let service = setup.service.with_due_date_settings(settings);

    let task = service
        .create_task(CreateTaskRequest::new("Hotfix", user_id("alice")).with_priority("urgent"))
        .await?;

    ensure!(
        task.due_date() == Some(Utc::now().date_naive()),
        "urgent task should be due today"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reminders_share_the_repository(setup: Setup) -> eyre::Result<()> {
    let service = setup.service;
    service
        .create_task(
            CreateTaskRequest::new("Pay invoice", user_id("alice"))
                .with_assignee(user_id("bob"))
                .with_priority("urgent"),
        )
        .await?;
    let scanner = ReminderService::new(
        Arc::clone(&setup.repository),
        Arc::new(DefaultClock),
        Arc::new(service.catalog().clone()),
    );

    let reminders = scanner.scan().await?;
    ensure!(reminders.len() == 1, "expected one due-soon reminder");
    ensure!(
        reminders
            .iter()
            .all(|r| r.recipients.contains(&user_id("bob"))),
        "assignee should be notified"
    );
    ensure!(scanner.scan().await?.is_empty(), "reminder repeated");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_delete_reports_every_forbidden_task(setup: Setup) -> eyre::Result<()> {
    let service = setup.service;
    let mut ids = Vec::new();
    for title in ["alpha", "beta"] {
        let task = service
            .create_task(
                CreateTaskRequest::new(title, user_id("alice"))
                    .with_collaborators([user_id("carol")]),
            )
            .await?;
        ids.push(task.id());
    }

    let result = service
        .delete_tasks(DeleteTasksRequest::new(ids.clone(), member("carol")))
        .await;
    let Err(TaskWorkflowError::BulkRejected(violations)) = result else {
        return Err(eyre::eyre!("expected bulk rejection"));
    };
    ensure!(violations.len() == 2, "every task should be reported");
    ensure!(service.list_tasks().await?.len() == 2, "nothing may be deleted");

    service
        .delete_tasks(DeleteTasksRequest::new(ids, member("alice")))
        .await?;
    ensure!(service.list_tasks().await?.is_empty(), "tasks not deleted");
    Ok(())
}
