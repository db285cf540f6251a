//! Reconcile a run's case membership against a target set of case IDs.

use std::collections::BTreeSet;

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use super::run_freeze::ensure_open;
use super::statuses::default_status;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::SyncOutcome;

/// Make the run's case set equal `target`.
///
/// Cases only in `target` gain a run-case in the default status; run-cases
/// whose case is absent from `target` are removed with their comments;
/// run-cases in both keep their status and assignee. Applied in one
/// transaction.
pub async fn sync_run_cases(
    db: &DatabaseConnection,
    run_id: i32,
    target: &[i32],
) -> AppResult<SyncOutcome> {
    let target: BTreeSet<i32> = target.iter().copied().collect();

    let txn = db.begin().await?;

    let run = db::runs::find_by_id(&txn, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", run_id)))?;
    ensure_open(&run)?;

    let existing = db::run_cases::list_by_run(&txn, run.id).await?;
    let existing_cases: BTreeSet<i32> = existing.iter().map(|rc| rc.test_case_id).collect();

    let added: Vec<i32> = target.difference(&existing_cases).copied().collect();
    let (removed_rows, kept): (Vec<_>, Vec<_>) = existing
        .iter()
        .partition(|rc| !target.contains(&rc.test_case_id));

    if !added.is_empty() {
        let found = db::cases::find_by_ids(&txn, &added).await?;
        if let Some(missing) = added.iter().find(|id| !found.iter().any(|c| c.id == **id)) {
            return Err(AppError::NotFound(format!("Test case {}", missing)));
        }
        if let Some(foreign) = found.iter().find(|c| c.project_id != run.project_id) {
            return Err(AppError::InvalidInput(format!(
                "Test case {} belongs to project {}, not {}",
                foreign.id, foreign.project_id, run.project_id
            )));
        }

        let status = default_status(&txn).await?;
        for case_id in &added {
            db::run_cases::insert(&txn, run.id, *case_id, status.id, None).await?;
        }
    }

    let removed_ids: Vec<i32> = removed_rows.iter().map(|rc| rc.id).collect();
    db::comments::delete_by_run_cases(&txn, &removed_ids).await?;
    db::run_cases::delete_by_ids(&txn, &removed_ids).await?;

    txn.commit().await?;

    let mut removed: Vec<i32> = removed_rows.iter().map(|rc| rc.test_case_id).collect();
    removed.sort_unstable();

    info!(
        run_id,
        added = added.len(),
        removed = removed.len(),
        unchanged = kept.len(),
        "Test run cases synchronized"
    );

    Ok(SyncOutcome {
        test_run_id: run.id,
        added,
        removed,
        unchanged: kept.len(),
    })
}
