//! Run-case status administration.
//!
//! Exactly one status carries the default flag. Promoting a status clears the
//! flag on every other row in the same transaction; clearing it directly is
//! rejected.

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::info;

use crate::db;
use crate::entity::status;
use crate::error::{AppError, AppResult};
use crate::models::{CreateStatusRequest, StatusListResponse, StatusView, UpdateStatusRequest};

/// The single default status.
///
/// Fails with `InvalidInput` when no status or more than one status carries
/// the default flag.
pub async fn default_status<C: ConnectionTrait>(db: &C) -> AppResult<status::Model> {
    let mut defaults = db::statuses::list_defaults(db).await?;
    match defaults.len() {
        1 => Ok(defaults.remove(0)),
        0 => Err(AppError::InvalidInput(
            "No default status is configured".to_string(),
        )),
        n => Err(AppError::InvalidInput(format!(
            "{} statuses are flagged as default, expected exactly one",
            n
        ))),
    }
}

pub async fn list_statuses<C: ConnectionTrait>(db: &C) -> AppResult<StatusListResponse> {
    let statuses = db::statuses::list_all(db).await?;

    let mut defaults = statuses.iter().filter(|s| s.is_default);
    let default_id = match (defaults.next(), defaults.next()) {
        (Some(only), None) => Some(only.id),
        _ => None,
    };

    Ok(StatusListResponse {
        entities: statuses.into_iter().map(StatusView::from).collect(),
        default_id,
    })
}

fn required<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}

pub async fn create_status(
    db: &DatabaseConnection,
    req: CreateStatusRequest,
) -> AppResult<StatusView> {
    let name = required("name", &req.name)?;
    let color = required("color", &req.color)?;

    let txn = db.begin().await?;

    let created = db::statuses::insert(&txn, name, color, req.is_default).await?;
    if created.is_default {
        db::statuses::clear_default_except(&txn, created.id).await?;
    }

    txn.commit().await?;

    info!(
        status_id = created.id,
        is_default = created.is_default,
        "Status created"
    );

    Ok(created.into())
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: i32,
    req: UpdateStatusRequest,
) -> AppResult<StatusView> {
    let txn = db.begin().await?;

    let existing = db::statuses::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Status {}", id)))?;

    if req.is_default == Some(false) && existing.is_default {
        return Err(AppError::InvalidInput(
            "The default status cannot be unset; promote another status instead".to_string(),
        ));
    }

    let promote = req.is_default == Some(true) && !existing.is_default;

    let mut active: status::ActiveModel = existing.into();
    if let Some(name) = &req.name {
        active.name = Set(required("name", name)?.to_string());
    }
    if let Some(color) = &req.color {
        active.color = Set(required("color", color)?.to_string());
    }
    if promote {
        active.is_default = Set(true);
    }
    active.updated_at = Set(Utc::now());

    let updated = db::statuses::update(&txn, active).await?;
    if promote {
        db::statuses::clear_default_except(&txn, updated.id).await?;
    }

    txn.commit().await?;

    info!(status_id = id, promoted = promote, "Status updated");

    Ok(updated.into())
}
