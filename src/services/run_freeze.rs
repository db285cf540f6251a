//! Run status state machine and the snapshot taken on completion.
//!
//! `NotStarted` and `InProgress` runs are served live. Entering `Completed`
//! materializes the run and stores it in the same conditional write that
//! flips the status, so a completed run always carries its snapshot.
//! Completed runs are served from that snapshot with their identifiers
//! reinjected.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{info, warn};

use super::permissions::Subject;
use super::run_view::{materialize, run_status, run_summary};
use crate::db;
use crate::entity::test_run;
use crate::error::{AppError, AppResult};
use crate::models::{RunStatus, RunSummary, RunView};

/// Fail with `Conflict` when the run is completed.
pub(crate) fn ensure_open(run: &test_run::Model) -> AppResult<()> {
    if run_status(run)?.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Test run {} is completed and can no longer change",
            run.id
        )));
    }
    Ok(())
}

/// Decode the stored snapshot of a completed run.
pub fn read_snapshot(run: &test_run::Model) -> AppResult<RunView> {
    let raw = run.frozen_snapshot.as_deref().ok_or_else(|| {
        AppError::Database(format!("Completed test run {} has no snapshot", run.id))
    })?;

    let mut view: RunView = serde_json::from_str(raw).map_err(|e| {
        AppError::Database(format!("Corrupt snapshot for test run {}: {}", run.id, e))
    })?;

    view.project_id = run.project_id;
    view.test_run_id = run.id;
    view.test_plan_id = run.test_plan_id;
    view.status = RunStatus::Completed;

    Ok(view)
}

/// Get the view of a run: frozen when completed, live otherwise.
pub async fn get_run_view<C: ConnectionTrait>(db: &C, run_id: i32) -> AppResult<RunView> {
    let run = db::runs::find_by_id(db, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", run_id)))?;

    match run_status(&run)? {
        RunStatus::Completed => read_snapshot(&run),
        RunStatus::NotStarted | RunStatus::InProgress => materialize(db, &run).await,
    }
}

/// Move a run to `next`. Entering `Completed` freezes the run.
///
/// Any transition out of `Completed`, including a repeated completion, fails
/// with `Conflict` and leaves the stored snapshot untouched.
pub async fn transition_run_status(
    db: &DatabaseConnection,
    actor: &Subject,
    run_id: i32,
    next: RunStatus,
) -> AppResult<RunSummary> {
    let txn = db.begin().await?;

    let run = db::runs::find_by_id(&txn, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", run_id)))?;
    let current = run_status(&run)?;
    ensure_open(&run)?;

    let started_at = match (run.started_at, next) {
        (None, RunStatus::InProgress) => Some(Utc::now()),
        (started_at, _) => started_at,
    };

    let written = match next {
        RunStatus::Completed => {
            let mut view = materialize(&txn, &run).await?;
            view.status = RunStatus::Completed;
            let snapshot = serde_json::to_string(&view).map_err(|e| {
                AppError::Database(format!("Failed to encode snapshot: {}", e))
            })?;
            db::runs::complete_with_snapshot(&txn, run.id, snapshot, started_at, actor.user_id)
                .await?
        }
        RunStatus::NotStarted | RunStatus::InProgress => {
            db::runs::set_open_status(&txn, run.id, next, started_at, actor.user_id).await?
        }
    };

    if written == 0 {
        warn!(run_id, "Test run was completed concurrently");
        return Err(AppError::Conflict(format!(
            "Test run {} is completed and can no longer change",
            run_id
        )));
    }

    let updated = db::runs::find_by_id(&txn, run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", run_id)))?;
    let summary = run_summary(&txn, &updated).await?;

    txn.commit().await?;

    info!(
        run_id,
        from = %current,
        to = %next,
        user_id = actor.user_id,
        "Test run status changed"
    );

    Ok(summary)
}
