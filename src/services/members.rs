//! Member record administration.

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use tracing::{info, warn};

use super::permissions::{self, Subject, ADMIN};
use crate::db;
use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::{MemberView, UpdateMemberRequest, UserStatus};

fn member_view(u: user::Model) -> AppResult<MemberView> {
    let status = UserStatus::parse(&u.status).ok_or_else(|| {
        AppError::InvalidInput(format!("User {} has unknown status '{}'", u.id, u.status))
    })?;

    Ok(MemberView {
        id: u.id,
        name: u.name,
        email: u.email,
        status,
        language: u.language,
        role_id: u.role_id,
    })
}

/// Update a member record.
///
/// A subject may edit their own record; any other record requires `admin`.
/// Changing `status` or `role_id` requires `admin` even on one's own record.
pub async fn update_member(
    db: &DatabaseConnection,
    subject: &Subject,
    target_user_id: i32,
    req: UpdateMemberRequest,
) -> AppResult<MemberView> {
    permissions::authorize_member_edit(db, subject, target_user_id).await?;

    if (req.status.is_some() || req.role_id.is_some())
        && !permissions::has_permission(db, subject, ADMIN).await?
    {
        warn!(
            user_id = subject.user_id,
            target_user_id, "Rejected status or role change without admin"
        );
        return Err(AppError::Forbidden(format!(
            "Missing '{}' permission",
            ADMIN
        )));
    }

    let existing = db::users::find_by_id(db, target_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", target_user_id)))?;

    let mut active: user::ActiveModel = existing.into();
    if let Some(name) = &req.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("name must not be empty".to_string()));
        }
        active.name = Set(name.to_string());
    }
    if let Some(email) = &req.email {
        let email = email.trim();
        if !email.contains('@') {
            return Err(AppError::InvalidInput(format!(
                "'{}' is not an email address",
                email
            )));
        }
        active.email = Set(email.to_string());
    }
    if let Some(language) = &req.language {
        active.language = Set(language.trim().to_string());
    }
    if let Some(status) = req.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(role_id) = req.role_id {
        if let Some(role_id) = role_id {
            db::users::find_role_by_id(db, role_id)
                .await?
                .ok_or_else(|| {
                    AppError::InvalidInput(format!("Role {} does not exist", role_id))
                })?;
        }
        active.role_id = Set(role_id);
    }
    active.updated_at = Set(Utc::now());

    let updated = db::users::update(db, active).await?;

    info!(
        user_id = subject.user_id,
        target_user_id, "Member updated"
    );

    member_view(updated)
}
