//! Database operations for test runs.

use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::test_run::{self, Column, Entity as TestRun};
use crate::error::AppResult;
use crate::models::RunStatus;

/// Get a run by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<test_run::Model>> {
    Ok(TestRun::find_by_id(id).one(db).await?)
}

/// Get every run of a plan, oldest first.
pub async fn list_by_plan<C: ConnectionTrait>(
    db: &C,
    plan_id: i32,
) -> AppResult<Vec<test_run::Model>> {
    Ok(TestRun::find()
        .filter(Column::TestPlanId.eq(plan_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Insert a run in the `NotStarted` state.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    plan_id: i32,
    title: &str,
    author_id: i32,
) -> AppResult<test_run::Model> {
    let now = Utc::now();

    let model = test_run::ActiveModel {
        project_id: Set(project_id),
        test_plan_id: Set(plan_id),
        title: Set(title.to_string()),
        status: Set(RunStatus::NotStarted.as_str().to_string()),
        started_at: Set(None),
        completed_at: Set(None),
        created_by: Set(Some(author_id)),
        updated_by: Set(Some(author_id)),
        frozen_snapshot: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Move a non-completed run to `InProgress` or `NotStarted`.
///
/// The update is conditional on the row not being completed; a return value of
/// zero means the run was completed (or deleted) concurrently.
pub async fn set_open_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    actor_id: i32,
) -> AppResult<u64> {
    let result = TestRun::update_many()
        .col_expr(Column::Status, Expr::value(status.as_str()))
        .col_expr(Column::StartedAt, Expr::value(started_at))
        .col_expr(Column::UpdatedBy, Expr::value(Some(actor_id)))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .filter(Column::Status.ne(RunStatus::Completed.as_str()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Mark a run completed and store its snapshot in one conditional write.
///
/// Returns zero when the run was already completed, leaving the stored
/// snapshot untouched.
pub async fn complete_with_snapshot<C: ConnectionTrait>(
    db: &C,
    id: i32,
    snapshot: String,
    started_at: Option<DateTime<Utc>>,
    actor_id: i32,
) -> AppResult<u64> {
    let now = Utc::now();

    let result = TestRun::update_many()
        .col_expr(Column::Status, Expr::value(RunStatus::Completed.as_str()))
        .col_expr(Column::FrozenSnapshot, Expr::value(Some(snapshot)))
        .col_expr(Column::StartedAt, Expr::value(started_at))
        .col_expr(Column::CompletedAt, Expr::value(Some(now)))
        .col_expr(Column::UpdatedBy, Expr::value(Some(actor_id)))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::Status.ne(RunStatus::Completed.as_str()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a run. Its run-cases must already be gone.
pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<u64> {
    let result = TestRun::delete_many()
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
