//! Database operations for projects.

use sea_orm::*;

use crate::entity::project;
use crate::error::AppResult;

/// Get a project by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<project::Model>> {
    Ok(project::Entity::find_by_id(id).one(db).await?)
}

/// Insert a project.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    code: &str,
    title: &str,
    description: Option<&str>,
) -> AppResult<project::Model> {
    let now = chrono::Utc::now();

    let model = project::ActiveModel {
        code: Set(code.to_string()),
        title: Set(title.to_string()),
        description: Set(description.map(|s| s.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}
