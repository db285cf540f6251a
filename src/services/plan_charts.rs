//! Status breakdown across the runs of a plan.
//!
//! Completed runs are counted from their frozen snapshot, open runs from the
//! live run-case rows. Buckets exist only for statuses that occur and are
//! ordered by status ID, descending.

use std::collections::{BTreeMap, HashMap};

use sea_orm::ConnectionTrait;

use super::run_freeze::read_snapshot;
use super::run_view::run_status;
use crate::config::FinishedStatuses;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{ChartEntry, PlanCharts, StatusRef};

/// Count observed statuses into chart buckets.
pub fn aggregate<I>(
    test_plan_id: i32,
    observed: I,
    finished_statuses: &FinishedStatuses,
    default_status_id: Option<i32>,
) -> PlanCharts
where
    I: IntoIterator<Item = StatusRef>,
{
    let mut buckets: BTreeMap<i32, (StatusRef, u64)> = BTreeMap::new();
    for status in observed {
        buckets.entry(status.id).or_insert((status, 0)).1 += 1;
    }

    let total: u64 = buckets.values().map(|(_, count)| count).sum();
    let finished: u64 = buckets
        .values()
        .filter(|(s, _)| finished_statuses.is_finished(s.id, &s.name, default_status_id))
        .map(|(_, count)| count)
        .sum();

    let percentage = if total == 0 {
        0.0
    } else {
        finished as f64 * 100.0 / total as f64
    };

    PlanCharts {
        test_plan_id,
        charts: buckets
            .into_values()
            .rev()
            .map(|(s, count)| ChartEntry {
                name: s.name,
                color: s.color,
                count,
            })
            .collect(),
        total,
        finished,
        percentage,
    }
}

pub async fn get_plan_charts<C: ConnectionTrait>(
    db: &C,
    plan_id: i32,
    finished_statuses: &FinishedStatuses,
) -> AppResult<PlanCharts> {
    db::plans::find_by_id(db, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test plan {}", plan_id)))?;

    let statuses: HashMap<i32, StatusRef> = db::statuses::list_all(db)
        .await?
        .iter()
        .map(|s| (s.id, StatusRef::from(s)))
        .collect();
    let default_status_id = db::statuses::list_defaults(db)
        .await?
        .first()
        .map(|s| s.id);

    let mut observed = Vec::new();
    let mut open_runs = Vec::new();
    for run in db::runs::list_by_plan(db, plan_id).await? {
        if run_status(&run)?.is_terminal() {
            let snapshot = read_snapshot(&run)?;
            // Prefer the current name and color of statuses that still exist.
            observed.extend(snapshot.run_cases().into_iter().map(|rc| {
                statuses
                    .get(&rc.status.id)
                    .cloned()
                    .unwrap_or_else(|| rc.status.clone())
            }));
        } else {
            open_runs.push(run.id);
        }
    }

    for rc in db::run_cases::list_by_runs(db, &open_runs).await? {
        let status = statuses.get(&rc.status_id).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Run-case {} references unknown status {}",
                rc.id, rc.status_id
            ))
        })?;
        observed.push(status.clone());
    }

    Ok(aggregate(
        plan_id,
        observed,
        finished_statuses,
        default_status_id,
    ))
}
