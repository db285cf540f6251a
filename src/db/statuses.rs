//! Database operations for run-case statuses.

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;

use crate::entity::status::{self, Column, Entity as Status};
use crate::error::AppResult;

/// Get every status, ordered by ID.
pub async fn list_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<status::Model>> {
    Ok(Status::find().order_by_asc(Column::Id).all(db).await?)
}

/// Get a status by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<status::Model>> {
    Ok(Status::find_by_id(id).one(db).await?)
}

/// Get every status flagged as default. A healthy table returns exactly one.
pub async fn list_defaults<C: ConnectionTrait>(db: &C) -> AppResult<Vec<status::Model>> {
    Ok(Status::find()
        .filter(Column::IsDefault.eq(true))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Count statuses.
pub async fn count<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
    Ok(Status::find().count(db).await?)
}

/// Insert a status.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    color: &str,
    is_default: bool,
) -> AppResult<status::Model> {
    let now = Utc::now();

    let model = status::ActiveModel {
        name: Set(name.to_string()),
        color: Set(color.to_string()),
        is_default: Set(is_default),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Persist the changed fields of a status. Only columns marked `Set` are written.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    active: status::ActiveModel,
) -> AppResult<status::Model> {
    Ok(active.update(db).await?)
}

/// Clear the default flag on every status except `keep_id`.
pub async fn clear_default_except<C: ConnectionTrait>(db: &C, keep_id: i32) -> AppResult<u64> {
    let result = Status::update_many()
        .col_expr(Column::IsDefault, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::IsDefault.eq(true))
        .filter(Column::Id.ne(keep_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
