//! Database operations for run-cases.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::test_run_case::{self, Column, Entity as TestRunCase};
use crate::error::AppResult;

/// Get a run-case by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<test_run_case::Model>> {
    Ok(TestRunCase::find_by_id(id).one(db).await?)
}

/// Find the run-case of a case within a run.
pub async fn find_by_run_and_case<C: ConnectionTrait>(
    db: &C,
    run_id: i32,
    case_id: i32,
) -> AppResult<Option<test_run_case::Model>> {
    Ok(TestRunCase::find()
        .filter(Column::TestRunId.eq(run_id))
        .filter(Column::TestCaseId.eq(case_id))
        .one(db)
        .await?)
}

/// Get every run-case of a run.
pub async fn list_by_run<C: ConnectionTrait>(
    db: &C,
    run_id: i32,
) -> AppResult<Vec<test_run_case::Model>> {
    Ok(TestRunCase::find()
        .filter(Column::TestRunId.eq(run_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Get every run-case belonging to any of the given runs.
pub async fn list_by_runs<C: ConnectionTrait>(
    db: &C,
    run_ids: &[i32],
) -> AppResult<Vec<test_run_case::Model>> {
    if run_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(TestRunCase::find()
        .filter(Column::TestRunId.is_in(run_ids.iter().copied()))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Get the IDs of every run-case referencing any of the given cases.
pub async fn ids_for_cases<C: ConnectionTrait>(db: &C, case_ids: &[i32]) -> AppResult<Vec<i32>> {
    if case_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = TestRunCase::find()
        .filter(Column::TestCaseId.is_in(case_ids.iter().copied()))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|r| r.id).collect())
}

/// Insert a run-case.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    run_id: i32,
    case_id: i32,
    status_id: i32,
    assigned_to_id: Option<i32>,
) -> AppResult<test_run_case::Model> {
    let now = Utc::now();

    let model = test_run_case::ActiveModel {
        test_run_id: Set(run_id),
        test_case_id: Set(case_id),
        status_id: Set(status_id),
        assigned_to_id: Set(assigned_to_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Set a run-case's status.
pub async fn set_status<C: ConnectionTrait>(db: &C, id: i32, status_id: i32) -> AppResult<u64> {
    let result = TestRunCase::update_many()
        .col_expr(Column::StatusId, Expr::value(status_id))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Set (or clear) a run-case's assignee.
pub async fn set_assignee<C: ConnectionTrait>(
    db: &C,
    id: i32,
    assigned_to_id: Option<i32>,
) -> AppResult<u64> {
    let result = TestRunCase::update_many()
        .col_expr(Column::AssignedToId, Expr::value(assigned_to_id))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete run-cases by ID. Their comments must already be gone.
pub async fn delete_by_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = TestRunCase::delete_many()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
