//! Database operations for milestones.

use sea_orm::*;

use crate::entity::milestone;
use crate::error::AppResult;

/// Get a milestone by ID.
pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<milestone::Model>> {
    Ok(milestone::Entity::find_by_id(id).one(db).await?)
}

/// Insert a milestone.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    title: &str,
) -> AppResult<milestone::Model> {
    let now = chrono::Utc::now();

    let model = milestone::ActiveModel {
        project_id: Set(project_id),
        title: Set(title.to_string()),
        description: Set(None),
        due_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}
