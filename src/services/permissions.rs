//! Permission resolution for an authenticated subject.
//!
//! Permissions are resolved from the store on every call; nothing is cached
//! in-process. Resolution fails closed: an unknown user, an inactive user or
//! a user without a role holds no permissions.

use std::collections::BTreeSet;

use sea_orm::ConnectionTrait;
use tracing::warn;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::UserStatus;

/// Permission required for catalog and run mutations.
pub const EDIT: &str = "edit";

/// Permission required for member and role administration.
pub const ADMIN: &str = "admin";

/// Authenticated caller, resolved upstream from the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub user_id: i32,
}

impl Subject {
    pub fn new(user_id: i32) -> Self {
        Self { user_id }
    }
}

/// Names of every permission reachable through the subject's role.
pub async fn resolve_permissions<C: ConnectionTrait>(
    db: &C,
    subject: &Subject,
) -> AppResult<BTreeSet<String>> {
    let Some(user) = db::users::find_by_id(db, subject.user_id).await? else {
        return Ok(BTreeSet::new());
    };

    if UserStatus::parse(&user.status) != Some(UserStatus::Active) {
        return Ok(BTreeSet::new());
    }

    let Some(role_id) = user.role_id else {
        return Ok(BTreeSet::new());
    };

    Ok(db::users::permission_names_for_role(db, role_id)
        .await?
        .into_iter()
        .collect())
}

/// Whether the subject holds `permission`.
pub async fn has_permission<C: ConnectionTrait>(
    db: &C,
    subject: &Subject,
    permission: &str,
) -> AppResult<bool> {
    Ok(resolve_permissions(db, subject).await?.contains(permission))
}

/// Fail with `Forbidden` unless the subject holds `permission`.
pub async fn authorize<C: ConnectionTrait>(
    db: &C,
    subject: &Subject,
    permission: &str,
) -> AppResult<()> {
    if has_permission(db, subject, permission).await? {
        return Ok(());
    }

    warn!(
        user_id = subject.user_id,
        permission, "Permission denied"
    );
    Err(AppError::Forbidden(format!(
        "Missing '{}' permission",
        permission
    )))
}

/// Fail with `Forbidden` unless the subject may edit the member record of
/// `target_user_id`: their own record always, any other record with `admin`.
pub async fn authorize_member_edit<C: ConnectionTrait>(
    db: &C,
    subject: &Subject,
    target_user_id: i32,
) -> AppResult<()> {
    if subject.user_id != target_user_id {
        return authorize(db, subject, ADMIN).await;
    }

    let active = db::users::find_by_id(db, subject.user_id)
        .await?
        .is_some_and(|u| UserStatus::parse(&u.status) == Some(UserStatus::Active));
    if active {
        return Ok(());
    }

    warn!(
        user_id = subject.user_id,
        "Inactive user attempted to edit own member record"
    );
    Err(AppError::Forbidden("Account is not active".to_string()))
}
