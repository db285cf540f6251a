//! Database operations for run-case comments.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::comment::{self, Column, Entity as Comment};
use crate::error::AppResult;

/// Get a comment by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<comment::Model>> {
    Ok(Comment::find_by_id(id).one(db).await?)
}

/// Get the comments of the given run-cases, oldest first.
pub async fn list_by_run_cases<C: ConnectionTrait>(
    db: &C,
    run_case_ids: &[i32],
) -> AppResult<Vec<comment::Model>> {
    if run_case_ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(Comment::find()
        .filter(Column::TestRunCaseId.is_in(run_case_ids.iter().copied()))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Insert a comment.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    run_case_id: i32,
    status_id: Option<i32>,
    content: &str,
    author_id: i32,
) -> AppResult<comment::Model> {
    let now = Utc::now();

    let model = comment::ActiveModel {
        test_run_case_id: Set(run_case_id),
        status_id: Set(status_id),
        content: Set(content.to_string()),
        created_by: Set(Some(author_id)),
        updated_by: Set(Some(author_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Replace a comment's text.
pub async fn set_content<C: ConnectionTrait>(
    db: &C,
    id: i32,
    content: &str,
    editor_id: i32,
) -> AppResult<u64> {
    let result = Comment::update_many()
        .col_expr(Column::Content, Expr::value(content))
        .col_expr(Column::UpdatedBy, Expr::value(Some(editor_id)))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a single comment.
pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<u64> {
    let result = Comment::delete_many()
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete every comment attached to any of the given run-cases.
pub async fn delete_by_run_cases<C: ConnectionTrait>(
    db: &C,
    run_case_ids: &[i32],
) -> AppResult<u64> {
    if run_case_ids.is_empty() {
        return Ok(0);
    }

    let result = Comment::delete_many()
        .filter(Column::TestRunCaseId.is_in(run_case_ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
