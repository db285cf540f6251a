//! Database operations for test cases.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::test_case::{self, Column, Entity as TestCase};
use crate::error::AppResult;

/// Fields for a new test case.
#[derive(Debug, Clone)]
pub struct NewCase<'a> {
    pub project_id: i32,
    pub test_suite_id: Option<i32>,
    pub milestone_id: Option<i32>,
    pub title: &'a str,
    pub content: &'a str,
    pub order_index: i32,
    pub author_id: i32,
}

/// Get a case by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<test_case::Model>> {
    Ok(TestCase::find_by_id(id).one(db).await?)
}

/// Get cases by ID, in no particular order.
pub async fn find_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> AppResult<Vec<test_case::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(TestCase::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?)
}

/// Get every case of a project, sibling-ordered.
pub async fn list_by_project<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
) -> AppResult<Vec<test_case::Model>> {
    Ok(TestCase::find()
        .filter(Column::ProjectId.eq(project_id))
        .order_by_asc(Column::OrderIndex)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Get the IDs of all cases filed directly under any of the given suites.
pub async fn ids_in_suites<C: ConnectionTrait>(db: &C, suite_ids: &[i32]) -> AppResult<Vec<i32>> {
    if suite_ids.is_empty() {
        return Ok(Vec::new());
    }

    let cases = TestCase::find()
        .filter(Column::TestSuiteId.is_in(suite_ids.iter().copied()))
        .all(db)
        .await?;

    Ok(cases.into_iter().map(|c| c.id).collect())
}

/// Next free `order_index` among the cases of a suite (or the unfiled list).
pub async fn next_order_index<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    test_suite_id: Option<i32>,
) -> AppResult<i32> {
    let suite_filter = match test_suite_id {
        Some(id) => Column::TestSuiteId.eq(id),
        None => Column::TestSuiteId.is_null(),
    };

    let last = TestCase::find()
        .filter(Column::ProjectId.eq(project_id))
        .filter(suite_filter)
        .order_by_desc(Column::OrderIndex)
        .one(db)
        .await?;

    Ok(last.map(|c| c.order_index + 1).unwrap_or(0))
}

/// Insert a case.
pub async fn insert<C: ConnectionTrait>(db: &C, new: NewCase<'_>) -> AppResult<test_case::Model> {
    let now = Utc::now();

    let model = test_case::ActiveModel {
        project_id: Set(new.project_id),
        test_suite_id: Set(new.test_suite_id),
        milestone_id: Set(new.milestone_id),
        title: Set(new.title.to_string()),
        content: Set(new.content.to_string()),
        order_index: Set(new.order_index),
        created_by: Set(Some(new.author_id)),
        updated_by: Set(Some(new.author_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Persist the changed fields of a case. Only columns marked `Set` are written.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    active: test_case::ActiveModel,
) -> AppResult<test_case::Model> {
    Ok(active.update(db).await?)
}

/// Set a case's suite and sibling position. Touches no other column.
pub async fn set_position<C: ConnectionTrait>(
    db: &C,
    id: i32,
    test_suite_id: Option<i32>,
    order_index: i32,
) -> AppResult<u64> {
    let result = TestCase::update_many()
        .col_expr(Column::TestSuiteId, Expr::value(test_suite_id))
        .col_expr(Column::OrderIndex, Expr::value(order_index))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete cases by ID. Their run-cases must already be gone.
pub async fn delete_by_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = TestCase::delete_many()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
