//! Run status transitions and the completion snapshot.

use casebook_lib::db;
use casebook_lib::error::AppError;
use casebook_lib::models::{RunStatus, UpdateCaseRequest};
use casebook_lib::services::{catalog, run_freeze, run_sync};

use super::test_helpers::*;

#[tokio::test]
async fn test_open_run_is_served_live() {
    let fx = setup().await;
    let suite = create_suite(&fx.pool, fx.project_id, None, "Login").await;
    let case = create_case(&fx.pool, &fx.editor, fx.project_id, Some(suite), "Valid login").await;
    let _empty = create_suite(&fx.pool, fx.project_id, None, "Empty").await;
    let (plan, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_sync::sync_run_cases(fx.pool.connection(), run, &[case])
        .await
        .unwrap();

    let view = run_freeze::get_run_view(fx.pool.connection(), run).await.unwrap();

    assert_eq!(view.status, RunStatus::NotStarted);
    assert_eq!(view.test_plan_id, plan);
    // Suites without run-cases are pruned.
    assert_eq!(view.entities.len(), 1);
    assert_eq!(view.entities[0].id, suite);
    assert_eq!(view.entities[0].test_cases[0].title, "Valid login");
    assert_eq!(view.entities[0].test_cases[0].status.name, "Untested");
    assert_eq!(view.folders.len(), 1);

    catalog::update_case(
        fx.pool.connection(),
        &fx.editor,
        case,
        UpdateCaseRequest {
            title: Some("Valid login (renamed)".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let view = run_freeze::get_run_view(fx.pool.connection(), run).await.unwrap();
    assert_eq!(view.entities[0].test_cases[0].title, "Valid login (renamed)");
}

#[tokio::test]
async fn test_completed_run_survives_catalog_edits() {
    let fx = setup().await;
    let suite = create_suite(&fx.pool, fx.project_id, None, "Checkout").await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, Some(suite), "Pay by card").await;
    let c2 = create_case(&fx.pool, &fx.editor, fx.project_id, Some(suite), "Pay by invoice").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_sync::sync_run_cases(fx.pool.connection(), run, &[c1, c2])
        .await
        .unwrap();

    let summary = run_freeze::transition_run_status(
        fx.pool.connection(),
        &fx.editor,
        run,
        RunStatus::Completed,
    )
    .await
    .unwrap();
    assert_eq!(summary.status, RunStatus::Completed);
    assert!(summary.completed_at.is_some());

    catalog::update_case(
        fx.pool.connection(),
        &fx.editor,
        c1,
        UpdateCaseRequest {
            title: Some("Pay by crypto".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    catalog::delete_case(fx.pool.connection(), c2).await.unwrap();

    let view = run_freeze::get_run_view(fx.pool.connection(), run).await.unwrap();
    assert_eq!(view.status, RunStatus::Completed);
    assert_eq!(view.test_run_id, run);
    let titles: Vec<&str> = view.run_cases().iter().map(|rc| rc.title.as_str()).collect();
    assert_eq!(titles, vec!["Pay by card", "Pay by invoice"]);
}

#[tokio::test]
async fn test_second_completion_conflicts_and_keeps_snapshot() {
    let fx = setup().await;
    let case = create_case(&fx.pool, &fx.editor, fx.project_id, None, "Smoke").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_sync::sync_run_cases(fx.pool.connection(), run, &[case])
        .await
        .unwrap();

    run_freeze::transition_run_status(fx.pool.connection(), &fx.editor, run, RunStatus::Completed)
        .await
        .unwrap();
    let first = db::runs::find_by_id(fx.pool.connection(), run)
        .await
        .unwrap()
        .unwrap()
        .frozen_snapshot;
    assert!(first.is_some());

    catalog::update_case(
        fx.pool.connection(),
        &fx.editor,
        case,
        UpdateCaseRequest {
            title: Some("Changed after freeze".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = run_freeze::transition_run_status(
        fx.pool.connection(),
        &fx.editor,
        run,
        RunStatus::Completed,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let second = db::runs::find_by_id(fx.pool.connection(), run)
        .await
        .unwrap()
        .unwrap()
        .frozen_snapshot;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_no_transition_out_of_completed() {
    let fx = setup().await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    run_freeze::transition_run_status(fx.pool.connection(), &fx.editor, run, RunStatus::Completed)
        .await
        .unwrap();

    for next in [RunStatus::NotStarted, RunStatus::InProgress] {
        let err = run_freeze::transition_run_status(fx.pool.connection(), &fx.editor, run, next)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}

#[tokio::test]
async fn test_entering_in_progress_stamps_started_at_once() {
    let fx = setup().await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let started = run_freeze::transition_run_status(
        fx.pool.connection(),
        &fx.editor,
        run,
        RunStatus::InProgress,
    )
    .await
    .unwrap();
    assert_eq!(started.status, RunStatus::InProgress);
    let stamp = started.started_at.expect("started_at stamped");

    let back = run_freeze::transition_run_status(
        fx.pool.connection(),
        &fx.editor,
        run,
        RunStatus::NotStarted,
    )
    .await
    .unwrap();
    assert_eq!(back.started_at, Some(stamp));

    let again = run_freeze::transition_run_status(
        fx.pool.connection(),
        &fx.editor,
        run,
        RunStatus::InProgress,
    )
    .await
    .unwrap();
    assert_eq!(again.started_at, Some(stamp));
}

#[tokio::test]
async fn test_completed_run_without_snapshot_is_a_storage_error() {
    let fx = setup().await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let mut row = db::runs::find_by_id(fx.pool.connection(), run).await.unwrap().unwrap();
    row.status = RunStatus::Completed.as_str().to_string();

    let err = run_freeze::read_snapshot(&row).unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
}

#[tokio::test]
async fn test_unknown_run_is_not_found() {
    let fx = setup().await;
    let err = run_freeze::get_run_view(fx.pool.connection(), 4_242).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
