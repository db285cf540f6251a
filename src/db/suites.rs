//! Database operations for test suites.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::test_suite::{self, Column, Entity as TestSuite};
use crate::error::AppResult;

/// Get a suite by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<test_suite::Model>> {
    Ok(TestSuite::find_by_id(id).one(db).await?)
}

/// Get suites by ID, in no particular order.
pub async fn find_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> AppResult<Vec<test_suite::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(TestSuite::find()
        .filter(Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?)
}

/// Get every suite of a project.
pub async fn list_by_project<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
) -> AppResult<Vec<test_suite::Model>> {
    Ok(TestSuite::find()
        .filter(Column::ProjectId.eq(project_id))
        .order_by_asc(Column::OrderIndex)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Next free `order_index` among the children of `parent_id`.
pub async fn next_order_index<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    parent_id: Option<i32>,
) -> AppResult<i32> {
    let parent_filter = match parent_id {
        Some(id) => Column::ParentId.eq(id),
        None => Column::ParentId.is_null(),
    };

    let last = TestSuite::find()
        .filter(Column::ProjectId.eq(project_id))
        .filter(parent_filter)
        .order_by_desc(Column::OrderIndex)
        .one(db)
        .await?;

    Ok(last.map(|s| s.order_index + 1).unwrap_or(0))
}

/// Insert a suite.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    parent_id: Option<i32>,
    name: &str,
    order_index: i32,
) -> AppResult<test_suite::Model> {
    let now = Utc::now();

    let model = test_suite::ActiveModel {
        project_id: Set(project_id),
        parent_id: Set(parent_id),
        name: Set(name.to_string()),
        order_index: Set(order_index),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Rename a suite.
pub async fn rename<C: ConnectionTrait>(db: &C, id: i32, name: &str) -> AppResult<u64> {
    let result = TestSuite::update_many()
        .col_expr(Column::Name, Expr::value(name))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Set a suite's parent and sibling position. Touches no other column.
pub async fn set_position<C: ConnectionTrait>(
    db: &C,
    id: i32,
    parent_id: Option<i32>,
    order_index: i32,
) -> AppResult<u64> {
    let result = TestSuite::update_many()
        .col_expr(Column::ParentId, Expr::value(parent_id))
        .col_expr(Column::OrderIndex, Expr::value(order_index))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a single suite. Children must already be gone.
pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<u64> {
    let result = TestSuite::delete_many()
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
