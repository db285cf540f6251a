//! Run-case synchronization against a target case set.

use std::collections::BTreeSet;

use casebook_lib::db;
use casebook_lib::error::AppError;
use casebook_lib::models::{RunStatus, UpdateRunCaseRequest};
use casebook_lib::services::{run_cases, run_freeze, run_sync};

use super::test_helpers::*;

async fn case_set(fx: &Fixture, run: i32) -> BTreeSet<i32> {
    db::run_cases::list_by_run(fx.pool.connection(), run)
        .await
        .unwrap()
        .into_iter()
        .map(|rc| rc.test_case_id)
        .collect()
}

#[tokio::test]
async fn test_sync_matches_target_and_keeps_progress() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let c2 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C2").await;
    let c3 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C3").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let first = run_sync::sync_run_cases(fx.pool.connection(), run, &[c1, c2])
        .await
        .unwrap();
    assert_eq!(first.added, vec![c1, c2]);
    assert!(first.removed.is_empty());

    let kept = db::run_cases::find_by_run_and_case(fx.pool.connection(), run, c2)
        .await
        .unwrap()
        .unwrap();
    let passed = status_id(&fx.pool, "Passed").await;
    run_cases::update_run_case(
        fx.pool.connection(),
        kept.id,
        UpdateRunCaseRequest {
            status_id: Some(passed),
            assigned_to_id: Some(Some(fx.viewer.user_id)),
        },
    )
    .await
    .unwrap();

    let second = run_sync::sync_run_cases(fx.pool.connection(), run, &[c2, c3, c3])
        .await
        .unwrap();
    assert_eq!(second.added, vec![c3]);
    assert_eq!(second.removed, vec![c1]);
    assert_eq!(second.unchanged, 1);

    assert_eq!(case_set(&fx, run).await, BTreeSet::from([c2, c3]));

    let after = db::run_cases::find_by_id(fx.pool.connection(), kept.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status_id, passed);
    assert_eq!(after.assigned_to_id, Some(fx.viewer.user_id));

    let untested = status_id(&fx.pool, "Untested").await;
    let added = db::run_cases::find_by_run_and_case(fx.pool.connection(), run, c3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(added.status_id, untested);
}

#[tokio::test]
async fn test_sync_to_empty_set_removes_everything() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_sync::sync_run_cases(fx.pool.connection(), run, &[c1])
        .await
        .unwrap();

    let outcome = run_sync::sync_run_cases(fx.pool.connection(), run, &[])
        .await
        .unwrap();

    assert_eq!(outcome.removed, vec![c1]);
    assert!(case_set(&fx, run).await.is_empty());
}

#[tokio::test]
async fn test_sync_rejects_unknown_and_foreign_cases_atomically() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let other = db::projects::insert(fx.pool.connection(), "OTHER", "Other", None)
        .await
        .unwrap();
    let foreign = create_case(&fx.pool, &fx.editor, other.id, None, "Foreign").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let missing = run_sync::sync_run_cases(fx.pool.connection(), run, &[c1, 9_999])
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));

    let cross = run_sync::sync_run_cases(fx.pool.connection(), run, &[c1, foreign])
        .await
        .unwrap_err();
    assert!(matches!(cross, AppError::InvalidInput(_)));

    assert!(case_set(&fx, run).await.is_empty());
}

#[tokio::test]
async fn test_sync_requires_single_default_status_only_when_adding() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_sync::sync_run_cases(fx.pool.connection(), run, &[c1])
        .await
        .unwrap();

    // Break the default-status invariant behind the service's back.
    let untested = status_id(&fx.pool, "Untested").await;
    let mut row: casebook_lib::entity::status::ActiveModel =
        db::statuses::find_by_id(fx.pool.connection(), untested)
            .await
            .unwrap()
            .unwrap()
            .into();
    row.is_default = sea_orm::Set(false);
    db::statuses::update(fx.pool.connection(), row).await.unwrap();

    // Nothing to insert: no default needed.
    let noop = run_sync::sync_run_cases(fx.pool.connection(), run, &[c1])
        .await
        .unwrap();
    assert_eq!(noop.unchanged, 1);

    let c2 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C2").await;
    let err = run_sync::sync_run_cases(fx.pool.connection(), run, &[c1, c2])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert_eq!(case_set(&fx, run).await, BTreeSet::from([c1]));
}

#[tokio::test]
async fn test_sync_on_completed_run_conflicts() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_freeze::transition_run_status(fx.pool.connection(), &fx.editor, run, RunStatus::Completed)
        .await
        .unwrap();

    let err = run_sync::sync_run_cases(fx.pool.connection(), run, &[c1])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
