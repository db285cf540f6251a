//! Database operations for users, roles and permissions.

use chrono::Utc;
use sea_orm::*;

use crate::entity::{permission, role, role_permission, user};
use crate::error::AppResult;
use crate::models::UserStatus;

/// Get a user by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(db).await?)
}

/// Get users by ID, in no particular order.
pub async fn find_by_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<Vec<user::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?)
}

/// Insert a user. The password hash is produced upstream.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    name: &str,
    email: &str,
    password_hash: &str,
    role_id: Option<i32>,
) -> AppResult<user::Model> {
    let now = Utc::now();

    let model = user::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        status: Set(UserStatus::Active.as_str().to_string()),
        language: Set("en".to_string()),
        role_id: Set(role_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Persist the changed fields of a user. Only columns marked `Set` are written.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    active: user::ActiveModel,
) -> AppResult<user::Model> {
    Ok(active.update(db).await?)
}

/// Get a role by name.
pub async fn find_role_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> AppResult<Option<role::Model>> {
    Ok(role::Entity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await?)
}

/// Get a role by ID.
pub async fn find_role_by_id<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<Option<role::Model>> {
    Ok(role::Entity::find_by_id(id).one(db).await?)
}

/// Names of the permissions granted to a role.
pub async fn permission_names_for_role<C: ConnectionTrait>(
    db: &C,
    role_id: i32,
) -> AppResult<Vec<String>> {
    let permissions = permission::Entity::find()
        .inner_join(role_permission::Entity)
        .filter(role_permission::Column::RoleId.eq(role_id))
        .order_by_asc(permission::Column::Id)
        .all(db)
        .await?;

    Ok(permissions.into_iter().map(|p| p.name).collect())
}

/// Get a permission by name.
pub async fn find_permission_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> AppResult<Option<permission::Model>> {
    Ok(permission::Entity::find()
        .filter(permission::Column::Name.eq(name))
        .one(db)
        .await?)
}

/// Count roles.
pub async fn count_roles<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
    Ok(role::Entity::find().count(db).await?)
}

/// Count permissions.
pub async fn count_permissions<C: ConnectionTrait>(db: &C) -> AppResult<u64> {
    Ok(permission::Entity::find().count(db).await?)
}

/// Insert a role.
pub async fn insert_role<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<role::Model> {
    let now = Utc::now();

    let model = role::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Insert a permission.
pub async fn insert_permission<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> AppResult<permission::Model> {
    let now = Utc::now();

    let model = permission::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(model.insert(db).await?)
}

/// Grant a permission to a role.
pub async fn grant<C: ConnectionTrait>(db: &C, role_id: i32, permission_id: i32) -> AppResult<()> {
    let model = role_permission::ActiveModel {
        role_id: Set(role_id),
        permission_id: Set(permission_id),
        ..Default::default()
    };

    model.insert(db).await?;
    Ok(())
}
