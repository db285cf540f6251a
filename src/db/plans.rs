//! Database operations for test plans.

use chrono::Utc;
use sea_orm::*;

use crate::entity::test_plan::{self, Column, Entity as TestPlan};
use crate::error::AppResult;
use crate::models::RunStatus;

/// Get a plan by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<test_plan::Model>> {
    Ok(TestPlan::find_by_id(id).one(db).await?)
}

/// Get every plan of a project, oldest first.
pub async fn list_by_project<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
) -> AppResult<Vec<test_plan::Model>> {
    Ok(TestPlan::find()
        .filter(Column::ProjectId.eq(project_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?)
}

/// Insert a plan in the `NotStarted` state.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    title: &str,
    author_id: i32,
) -> AppResult<test_plan::Model> {
    let now = Utc::now();

    let model = test_plan::ActiveModel {
        project_id: Set(project_id),
        title: Set(title.to_string()),
        status: Set(RunStatus::NotStarted.as_str().to_string()),
        started_at: Set(None),
        completed_at: Set(None),
        created_by: Set(Some(author_id)),
        updated_by: Set(Some(author_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Persist the changed fields of a plan. Only columns marked `Set` are written.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    active: test_plan::ActiveModel,
) -> AppResult<test_plan::Model> {
    Ok(active.update(db).await?)
}

/// Delete a plan. Its runs must already be gone.
pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<u64> {
    let result = TestPlan::delete_many()
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
