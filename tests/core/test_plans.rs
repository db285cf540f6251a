//! Plan listing, detail, updates and cascading deletes.

use actix_web::http::StatusCode;
use actix_web::test;
use casebook_lib::config::FinishedStatuses;
use casebook_lib::db;
use casebook_lib::error::AppError;
use casebook_lib::models::{CreateCommentRequest, CreatePlanRequest, RunStatus, UpdatePlanRequest};
use casebook_lib::services::{plans, run_cases, run_sync};
use serde_json::{Value, json};

use super::test_helpers::*;

#[tokio::test]
async fn test_list_plans_returns_project_plans_in_creation_order() {
    let fx = setup().await;
    let (first, _) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let second = plans::create_plan(
        fx.pool.connection(),
        &fx.editor,
        CreatePlanRequest {
            project_id: fx.project_id,
            title: "Hotfix plan".to_string(),
        },
    )
    .await
    .unwrap();

    let listed = plans::list_plans(fx.pool.connection(), fx.project_id)
        .await
        .unwrap();

    let ids: Vec<i32> = listed.entities.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![first, second.id]);
    assert!(listed.entities.iter().all(|p| p.status == RunStatus::NotStarted));

    let err = plans::list_plans(fx.pool.connection(), 9_999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_get_plan_includes_runs_and_charts() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let c2 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C2").await;
    let (plan, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let empty_run = create_run(&fx.pool, &fx.editor, plan, "Empty").await;

    run_sync::sync_run_cases(fx.pool.connection(), run, &[c1, c2])
        .await
        .unwrap();

    let detail = plans::get_plan(fx.pool.connection(), plan, &FinishedStatuses::AllButDefault)
        .await
        .unwrap();

    assert_eq!(detail.plan.id, plan);
    assert_eq!(detail.plan.title, "Release plan");
    assert_eq!(
        detail.runs.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![run, empty_run]
    );
    assert_eq!(detail.runs[0].count, 2);
    assert_eq!(detail.runs[1].count, 0);
    assert_eq!(detail.charts.test_plan_id, plan);
    assert_eq!(detail.charts.total, 2);
    assert_eq!(detail.charts.finished, 0);

    let err = plans::get_plan(fx.pool.connection(), 9_999, &FinishedStatuses::AllButDefault)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_plan_stamps_start_and_completion() {
    let fx = setup().await;
    let (plan, _) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let renamed = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            title: Some("  Sprint 12  ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.title, "Sprint 12");
    assert_eq!(renamed.status, RunStatus::NotStarted);
    assert!(renamed.started_at.is_none());

    let started = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            status: Some(RunStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(started.status, RunStatus::InProgress);
    assert!(started.started_at.is_some());
    assert!(started.completed_at.is_none());
    let started_at = db::plans::find_by_id(fx.pool.connection(), plan)
        .await
        .unwrap()
        .and_then(|p| p.started_at);

    // Going back and forth keeps the first start time.
    plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            status: Some(RunStatus::NotStarted),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let restarted = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            status: Some(RunStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(restarted.started_at, started_at);

    let completed = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            status: Some(RunStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(completed.status, RunStatus::Completed);
    assert_eq!(completed.started_at, started_at);
    assert!(completed.completed_at.is_some());

    let stored = db::plans::find_by_id(fx.pool.connection(), plan)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.updated_by, Some(fx.editor.user_id));
}

#[tokio::test]
async fn test_update_plan_rejects_bad_input_and_reopening() {
    let fx = setup().await;
    let (plan, _) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let err = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            title: Some("   ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        9_999,
        UpdatePlanRequest::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            status: Some(RunStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            status: Some(RunStatus::InProgress),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A completed plan can still be renamed.
    let renamed = plans::update_plan(
        fx.pool.connection(),
        &fx.editor,
        plan,
        UpdatePlanRequest {
            title: Some("Archived".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(renamed.title, "Archived");
    assert_eq!(renamed.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_delete_plan_removes_runs_run_cases_and_comments() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let (plan, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let second_run = create_run(&fx.pool, &fx.editor, plan, "Second").await;
    let (other_plan, other_run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    for r in [run, second_run, other_run] {
        run_sync::sync_run_cases(fx.pool.connection(), r, &[c1])
            .await
            .unwrap();
    }
    let rc = db::run_cases::find_by_run_and_case(fx.pool.connection(), run, c1)
        .await
        .unwrap()
        .unwrap();
    let comment = run_cases::add_comment(
        fx.pool.connection(),
        &fx.editor,
        rc.id,
        CreateCommentRequest {
            content: "Flaky on CI".to_string(),
            status_id: None,
        },
    )
    .await
    .unwrap();

    plans::delete_plan(fx.pool.connection(), plan).await.unwrap();

    let conn = fx.pool.connection();
    assert!(db::plans::find_by_id(conn, plan).await.unwrap().is_none());
    assert!(db::runs::find_by_id(conn, run).await.unwrap().is_none());
    assert!(db::runs::find_by_id(conn, second_run).await.unwrap().is_none());
    assert!(db::run_cases::find_by_id(conn, rc.id).await.unwrap().is_none());
    assert!(db::comments::find_by_id(conn, comment.id).await.unwrap().is_none());

    // The other plan is untouched.
    assert!(db::plans::find_by_id(conn, other_plan).await.unwrap().is_some());
    assert_eq!(db::run_cases::list_by_run(conn, other_run).await.unwrap().len(), 1);

    let err = plans::delete_plan(conn, plan).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[actix_rt::test]
async fn test_plan_routes_over_http() {
    let fx = setup().await;
    let app = create_test_app(&fx.pool).await;
    let editor = token_for(&fx.editor);
    let viewer = token_for(&fx.viewer);
    let (plan, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{}/plans", fx.project_id))
        .insert_header(("Authorization", format!("Bearer {}", viewer)))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["entities"][0]["id"], plan);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/plans/{}", plan))
        .insert_header(("Authorization", format!("Bearer {}", viewer)))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["plan"]["id"], plan);
    assert_eq!(detail["runs"][0]["id"], run);
    assert_eq!(detail["charts"]["total"], 0);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/plans/{}", plan))
        .insert_header(("Authorization", format!("Bearer {}", viewer)))
        .set_json(json!({ "title": "Blocked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/plans/{}", plan))
        .insert_header(("Authorization", format!("Bearer {}", editor)))
        .set_json(json!({ "status": "InProgress" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["status"], "InProgress");
    assert!(!updated["started_at"].is_null());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/plans/{}", plan))
        .insert_header(("Authorization", format!("Bearer {}", viewer)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/plans/{}", plan))
        .insert_header(("Authorization", format!("Bearer {}", editor)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["deleted"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/plans/{}", plan))
        .insert_header(("Authorization", format!("Bearer {}", editor)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
