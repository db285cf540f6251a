//! Test plans and the runs filed under them.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::info;

use super::permissions::Subject;
use super::plan_charts::get_plan_charts;
use super::run_view::summarize;
use crate::config::FinishedStatuses;
use crate::db;
use crate::entity::{test_plan, test_run_case};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreatePlanRequest, CreateRunRequest, PlanDetail, PlanListResponse, PlanView,
    RunListResponse, RunStatus, RunSummary, UpdatePlanRequest,
};

fn plan_view(plan: test_plan::Model) -> AppResult<PlanView> {
    let status = RunStatus::parse(&plan.status).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Test plan {} has unknown status '{}'",
            plan.id, plan.status
        ))
    })?;

    Ok(PlanView {
        id: plan.id,
        project_id: plan.project_id,
        title: plan.title,
        status,
        started_at: plan.started_at,
        completed_at: plan.completed_at,
    })
}

fn required_title(title: &str) -> AppResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }
    Ok(trimmed)
}

pub async fn create_plan<C: ConnectionTrait>(
    db: &C,
    actor: &Subject,
    req: CreatePlanRequest,
) -> AppResult<PlanView> {
    let title = required_title(&req.title)?;

    db::projects::find_by_id(db, req.project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", req.project_id)))?;

    let plan = db::plans::insert(db, req.project_id, title, actor.user_id).await?;

    info!(
        plan_id = plan.id,
        project_id = plan.project_id,
        "Test plan created"
    );

    plan_view(plan)
}

/// Every plan of a project.
pub async fn list_plans<C: ConnectionTrait>(db: &C, project_id: i32) -> AppResult<PlanListResponse> {
    db::projects::find_by_id(db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", project_id)))?;

    let entities = db::plans::list_by_project(db, project_id)
        .await?
        .into_iter()
        .map(plan_view)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(PlanListResponse { entities })
}

/// A plan with its run summaries and status charts.
pub async fn get_plan<C: ConnectionTrait>(
    db: &C,
    id: i32,
    finished_statuses: &FinishedStatuses,
) -> AppResult<PlanDetail> {
    let plan = db::plans::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test plan {}", id)))?;

    let runs = list_plan_runs(db, id).await?.entities;
    let charts = get_plan_charts(db, id, finished_statuses).await?;

    Ok(PlanDetail {
        plan: plan_view(plan)?,
        runs,
        charts,
    })
}

/// Update a plan's title and status.
///
/// `started_at` is stamped the first time the plan enters `InProgress` and
/// `completed_at` when it enters `Completed`. A completed plan keeps its
/// status.
pub async fn update_plan(
    db: &DatabaseConnection,
    actor: &Subject,
    id: i32,
    req: UpdatePlanRequest,
) -> AppResult<PlanView> {
    let title = req.title.as_deref().map(required_title).transpose()?;

    let txn = db.begin().await?;

    let plan = db::plans::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test plan {}", id)))?;
    let current = plan_view(plan.clone())?.status;

    let now = Utc::now();
    let mut active: test_plan::ActiveModel = plan.clone().into();

    if let Some(title) = title {
        active.title = Set(title.to_string());
    }
    if let Some(next) = req.status {
        if current.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Test plan {} is completed and can no longer change status",
                id
            )));
        }
        active.status = Set(next.as_str().to_string());
        if next == RunStatus::InProgress && plan.started_at.is_none() {
            active.started_at = Set(Some(now));
        }
        if next == RunStatus::Completed {
            active.completed_at = Set(Some(now));
        }
    }
    active.updated_by = Set(Some(actor.user_id));
    active.updated_at = Set(now);

    let updated = db::plans::update(&txn, active).await?;

    txn.commit().await?;

    info!(
        plan_id = id,
        from = %current,
        to = %updated.status,
        user_id = actor.user_id,
        "Test plan updated"
    );

    plan_view(updated)
}

/// Delete a plan with its runs, their run-cases and those run-cases' comments.
pub async fn delete_plan(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    db::plans::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test plan {}", id)))?;

    let run_ids: Vec<i32> = db::runs::list_by_plan(&txn, id)
        .await?
        .into_iter()
        .map(|run| run.id)
        .collect();
    let run_case_ids: Vec<i32> = db::run_cases::list_by_runs(&txn, &run_ids)
        .await?
        .into_iter()
        .map(|rc| rc.id)
        .collect();

    db::comments::delete_by_run_cases(&txn, &run_case_ids).await?;
    db::run_cases::delete_by_ids(&txn, &run_case_ids).await?;
    for run_id in &run_ids {
        db::runs::delete_by_id(&txn, *run_id).await?;
    }
    db::plans::delete_by_id(&txn, id).await?;

    txn.commit().await?;

    info!(
        plan_id = id,
        deleted_runs = run_ids.len(),
        deleted_run_cases = run_case_ids.len(),
        "Test plan deleted"
    );

    Ok(())
}

/// Create a run in `NotStarted` under a plan, in the plan's project.
pub async fn create_run<C: ConnectionTrait>(
    db: &C,
    actor: &Subject,
    req: CreateRunRequest,
) -> AppResult<RunSummary> {
    let title = required_title(&req.title)?;

    let plan = db::plans::find_by_id(db, req.test_plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test plan {}", req.test_plan_id)))?;

    let run = db::runs::insert(db, plan.project_id, plan.id, title, actor.user_id).await?;

    info!(run_id = run.id, plan_id = plan.id, "Test run created");

    summarize(&run, &[])
}

/// Every run of a plan with its case count and case IDs.
pub async fn list_plan_runs<C: ConnectionTrait>(db: &C, plan_id: i32) -> AppResult<RunListResponse> {
    db::plans::find_by_id(db, plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test plan {}", plan_id)))?;

    let runs = db::runs::list_by_plan(db, plan_id).await?;
    let run_ids: Vec<i32> = runs.iter().map(|r| r.id).collect();

    let mut by_run: HashMap<i32, Vec<&test_run_case::Model>> = HashMap::new();
    let run_cases = db::run_cases::list_by_runs(db, &run_ids).await?;
    for rc in &run_cases {
        by_run.entry(rc.test_run_id).or_default().push(rc);
    }

    let entities = runs
        .iter()
        .map(|run| summarize(run, by_run.get(&run.id).map(Vec::as_slice).unwrap_or(&[])))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(RunListResponse { entities })
}

/// Delete a run with its run-cases and their comments. Completed runs may
/// be deleted.
pub async fn delete_run(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    db::runs::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", id)))?;

    let run_case_ids: Vec<i32> = db::run_cases::list_by_run(&txn, id)
        .await?
        .into_iter()
        .map(|rc| rc.id)
        .collect();
    db::comments::delete_by_run_cases(&txn, &run_case_ids).await?;
    db::run_cases::delete_by_ids(&txn, &run_case_ids).await?;
    db::runs::delete_by_id(&txn, id).await?;

    txn.commit().await?;

    info!(
        run_id = id,
        deleted_run_cases = run_case_ids.len(),
        "Test run deleted"
    );

    Ok(())
}
