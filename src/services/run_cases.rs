//! Single run-case and comment operations.
//!
//! Run-cases and comments of a completed run are immutable.

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::info;

use super::permissions::Subject;
use super::run_freeze::ensure_open;
use super::run_view::{comment_view, run_case_view};
use super::statuses::default_status;
use crate::db;
use crate::entity::{test_run, test_run_case};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddRunCaseRequest, CommentView, CreateCommentRequest, RunCaseView, UpdateCommentRequest,
    UpdateRunCaseRequest,
};

async fn load_run_case<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> AppResult<(test_run_case::Model, test_run::Model)> {
    let rc = db::run_cases::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Run-case {}", id)))?;
    let run = db::runs::find_by_id(db, rc.test_run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", rc.test_run_id)))?;
    Ok((rc, run))
}

async fn require_status<C: ConnectionTrait>(db: &C, status_id: i32) -> AppResult<()> {
    db::statuses::find_by_id(db, status_id)
        .await?
        .ok_or_else(|| AppError::InvalidInput(format!("Status {} does not exist", status_id)))?;
    Ok(())
}

async fn require_user<C: ConnectionTrait>(db: &C, user_id: i32) -> AppResult<()> {
    db::users::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::InvalidInput(format!("User {} does not exist", user_id)))?;
    Ok(())
}

pub async fn get_run_case<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<RunCaseView> {
    let rc = db::run_cases::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Run-case {}", id)))?;
    run_case_view(db, &rc).await
}

/// Add one case to a run in the default status.
pub async fn add_run_case(db: &DatabaseConnection, req: AddRunCaseRequest) -> AppResult<RunCaseView> {
    let txn = db.begin().await?;

    let run = db::runs::find_by_id(&txn, req.test_run_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test run {}", req.test_run_id)))?;
    ensure_open(&run)?;

    let case = db::cases::find_by_id(&txn, req.test_case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", req.test_case_id)))?;
    if case.project_id != run.project_id {
        return Err(AppError::InvalidInput(format!(
            "Test case {} belongs to project {}, not {}",
            case.id, case.project_id, run.project_id
        )));
    }

    if db::run_cases::find_by_run_and_case(&txn, run.id, case.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Test case {} is already part of test run {}",
            case.id, run.id
        )));
    }

    if let Some(user_id) = req.assigned_to_id {
        require_user(&txn, user_id).await?;
    }

    let status = default_status(&txn).await?;
    let rc =
        db::run_cases::insert(&txn, run.id, case.id, status.id, req.assigned_to_id).await?;

    txn.commit().await?;

    info!(
        run_case_id = rc.id,
        run_id = run.id,
        case_id = case.id,
        "Run-case added"
    );

    run_case_view(db, &rc).await
}

/// Change a run-case's status and/or assignee.
pub async fn update_run_case(
    db: &DatabaseConnection,
    id: i32,
    req: UpdateRunCaseRequest,
) -> AppResult<RunCaseView> {
    let txn = db.begin().await?;

    let (rc, run) = load_run_case(&txn, id).await?;
    ensure_open(&run)?;

    if let Some(status_id) = req.status_id {
        require_status(&txn, status_id).await?;
        db::run_cases::set_status(&txn, rc.id, status_id).await?;
    }
    if let Some(assignee) = req.assigned_to_id {
        if let Some(user_id) = assignee {
            require_user(&txn, user_id).await?;
        }
        db::run_cases::set_assignee(&txn, rc.id, assignee).await?;
    }

    let updated = db::run_cases::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Run-case {}", id)))?;

    txn.commit().await?;

    info!(
        run_case_id = id,
        status_id = updated.status_id,
        assigned_to_id = ?updated.assigned_to_id,
        "Run-case updated"
    );

    run_case_view(db, &updated).await
}

/// Remove a run-case and its comments.
pub async fn delete_run_case(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    let (rc, run) = load_run_case(&txn, id).await?;
    ensure_open(&run)?;

    db::comments::delete_by_run_cases(&txn, &[rc.id]).await?;
    db::run_cases::delete_by_ids(&txn, &[rc.id]).await?;

    txn.commit().await?;

    info!(run_case_id = id, run_id = run.id, "Run-case deleted");

    Ok(())
}

/// Comment on a run-case. A comment carrying a status also moves the
/// run-case to that status.
pub async fn add_comment(
    db: &DatabaseConnection,
    actor: &Subject,
    run_case_id: i32,
    req: CreateCommentRequest,
) -> AppResult<CommentView> {
    if req.content.trim().is_empty() && req.status_id.is_none() {
        return Err(AppError::InvalidInput(
            "A comment needs content or a status".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let (rc, run) = load_run_case(&txn, run_case_id).await?;
    ensure_open(&run)?;

    if let Some(status_id) = req.status_id {
        require_status(&txn, status_id).await?;
        db::run_cases::set_status(&txn, rc.id, status_id).await?;
    }
    let created =
        db::comments::insert(&txn, rc.id, req.status_id, &req.content, actor.user_id).await?;

    txn.commit().await?;

    info!(
        comment_id = created.id,
        run_case_id,
        status_id = ?created.status_id,
        "Comment added"
    );

    comment_view(db, &created).await
}

pub async fn update_comment(
    db: &DatabaseConnection,
    actor: &Subject,
    id: i32,
    req: UpdateCommentRequest,
) -> AppResult<CommentView> {
    let txn = db.begin().await?;

    let existing = db::comments::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))?;
    let (_, run) = load_run_case(&txn, existing.test_run_case_id).await?;
    ensure_open(&run)?;

    db::comments::set_content(&txn, id, &req.content, actor.user_id).await?;
    let updated = db::comments::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))?;

    txn.commit().await?;

    info!(comment_id = id, "Comment updated");

    comment_view(db, &updated).await
}

pub async fn delete_comment(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    let existing = db::comments::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))?;
    let (_, run) = load_run_case(&txn, existing.test_run_case_id).await?;
    ensure_open(&run)?;

    db::comments::delete_by_id(&txn, id).await?;

    txn.commit().await?;

    info!(comment_id = id, "Comment deleted");

    Ok(())
}
