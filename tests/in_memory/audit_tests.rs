//! In-memory audit log behaviour.

use super::helpers::{audit_log, status, user_id};
use chrono::{TimeZone, Utc};
use eyre::ensure;
use rstest::rstest;
use workboard::task::{
    adapters::memory::InMemoryAuditLog,
    domain::{AuditEntry, TaskId},
    ports::AuditLog,
};

fn entry(task_id: TaskId, from: &str, to: &str, hour: u32) -> AuditEntry {
    let timestamp = Utc
        .with_ymd_and_hms(2026, 2, 3, hour, 0, 0)
        .single()
        .expect("valid timestamp");
    AuditEntry::new(task_id, status(from), status(to), user_id("alice"), timestamp)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn entries_for_filters_by_task_in_append_order(
    audit_log: InMemoryAuditLog,
) -> eyre::Result<()> {
    let tracked = TaskId::new();
    let other = TaskId::new();
    audit_log
        .append(&[
            entry(tracked, "TODO", "INPROGRESS", 9),
            entry(other, "TODO", "ONHOLD", 10),
        ])
        .await?;
    audit_log
        .append(&[entry(tracked, "INPROGRESS", "DONE", 11).with_reason("wrapped up")])
        .await?;

    let trail = audit_log.entries_for(tracked).await?;
    let steps: Vec<_> = trail
        .iter()
        .map(|e| (e.old_status().as_str(), e.new_status().as_str()))
        .collect();
    ensure!(
        steps == [("TODO", "INPROGRESS"), ("INPROGRESS", "DONE")],
        "unexpected trail {steps:?}"
    );
    ensure!(
        trail.last().and_then(AuditEntry::reason) == Some("wrapped up"),
        "reason lost"
    );
    ensure!(audit_log.all_entries()?.len() == 3, "entries dropped");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_has_empty_trail(audit_log: InMemoryAuditLog) -> eyre::Result<()> {
    ensure!(
        audit_log.entries_for(TaskId::new()).await?.is_empty(),
        "expected no entries"
    );
    Ok(())
}
