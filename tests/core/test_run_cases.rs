//! Single run-case and comment operations.

use casebook_lib::error::AppError;
use casebook_lib::models::{
    AddRunCaseRequest, CreateCommentRequest, RunStatus, UpdateCommentRequest, UpdateRunCaseRequest,
};
use casebook_lib::services::{run_cases, run_freeze};

use super::test_helpers::*;

fn add(run: i32, case: i32) -> AddRunCaseRequest {
    AddRunCaseRequest {
        test_run_id: run,
        test_case_id: case,
        assigned_to_id: None,
    }
}

#[tokio::test]
async fn test_add_run_case_defaults_and_rejects_duplicates() {
    let fx = setup().await;
    let case = create_case(&fx.pool, &fx.editor, fx.project_id, None, "Login").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let view = run_cases::add_run_case(fx.pool.connection(), add(run, case))
        .await
        .unwrap();
    assert_eq!(view.test_case_id, case);
    assert_eq!(view.title, "Login");
    assert_eq!(view.status.name, "Untested");
    assert!(view.assigned_to.is_none());

    let err = run_cases::add_run_case(fx.pool.connection(), add(run, case))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_update_run_case_assigns_and_unassigns() {
    let fx = setup().await;
    let case = create_case(&fx.pool, &fx.editor, fx.project_id, None, "Login").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let rc = run_cases::add_run_case(fx.pool.connection(), add(run, case))
        .await
        .unwrap();

    let assigned = run_cases::update_run_case(
        fx.pool.connection(),
        rc.id,
        UpdateRunCaseRequest {
            status_id: None,
            assigned_to_id: Some(Some(fx.editor.user_id)),
        },
    )
    .await
    .unwrap();
    assert_eq!(assigned.assigned_to.map(|u| u.id), Some(fx.editor.user_id));
    assert_eq!(assigned.status.name, "Untested");

    let cleared = run_cases::update_run_case(
        fx.pool.connection(),
        rc.id,
        UpdateRunCaseRequest {
            status_id: None,
            assigned_to_id: Some(None),
        },
    )
    .await
    .unwrap();
    assert!(cleared.assigned_to.is_none());

    let err = run_cases::update_run_case(
        fx.pool.connection(),
        rc.id,
        UpdateRunCaseRequest {
            status_id: Some(9_999),
            assigned_to_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_comment_with_status_moves_run_case() {
    let fx = setup().await;
    let case = create_case(&fx.pool, &fx.editor, fx.project_id, None, "Login").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let rc = run_cases::add_run_case(fx.pool.connection(), add(run, case))
        .await
        .unwrap();
    let failed = status_id(&fx.pool, "Failed").await;

    let comment = run_cases::add_comment(
        fx.pool.connection(),
        &fx.editor,
        rc.id,
        CreateCommentRequest {
            content: "Button does nothing".to_string(),
            status_id: Some(failed),
        },
    )
    .await
    .unwrap();
    assert_eq!(comment.status.as_ref().map(|s| s.id), Some(failed));
    assert_eq!(comment.created_by.as_ref().map(|u| u.id), Some(fx.editor.user_id));

    let view = run_cases::get_run_case(fx.pool.connection(), rc.id).await.unwrap();
    assert_eq!(view.status.id, failed);
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[0].content, "Button does nothing");

    let edited = run_cases::update_comment(
        fx.pool.connection(),
        &fx.admin,
        comment.id,
        UpdateCommentRequest {
            content: "Fixed in build 42".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(edited.content, "Fixed in build 42");
    assert_eq!(edited.updated_by.map(|u| u.id), Some(fx.admin.user_id));

    run_cases::delete_comment(fx.pool.connection(), comment.id)
        .await
        .unwrap();
    let view = run_cases::get_run_case(fx.pool.connection(), rc.id).await.unwrap();
    assert!(view.comments.is_empty());
    // Deleting the comment does not roll back the status it set.
    assert_eq!(view.status.id, failed);
}

#[tokio::test]
async fn test_blank_comment_without_status_is_rejected() {
    let fx = setup().await;
    let case = create_case(&fx.pool, &fx.editor, fx.project_id, None, "Login").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let rc = run_cases::add_run_case(fx.pool.connection(), add(run, case))
        .await
        .unwrap();

    let err = run_cases::add_comment(
        fx.pool.connection(),
        &fx.editor,
        rc.id,
        CreateCommentRequest {
            content: "   ".to_string(),
            status_id: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_completed_run_rejects_run_case_mutations() {
    let fx = setup().await;
    let c1 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C1").await;
    let c2 = create_case(&fx.pool, &fx.editor, fx.project_id, None, "C2").await;
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;
    let rc = run_cases::add_run_case(fx.pool.connection(), add(run, c1))
        .await
        .unwrap();
    let comment = run_cases::add_comment(
        fx.pool.connection(),
        &fx.editor,
        rc.id,
        CreateCommentRequest {
            content: "Looks good".to_string(),
            status_id: None,
        },
    )
    .await
    .unwrap();

    run_freeze::transition_run_status(fx.pool.connection(), &fx.editor, run, RunStatus::Completed)
        .await
        .unwrap();

    let passed = status_id(&fx.pool, "Passed").await;
    let errors = [
        run_cases::add_run_case(fx.pool.connection(), add(run, c2))
            .await
            .map(|_| ())
            .unwrap_err(),
        run_cases::update_run_case(
            fx.pool.connection(),
            rc.id,
            UpdateRunCaseRequest {
                status_id: Some(passed),
                assigned_to_id: None,
            },
        )
        .await
        .map(|_| ())
        .unwrap_err(),
        run_cases::add_comment(
            fx.pool.connection(),
            &fx.editor,
            rc.id,
            CreateCommentRequest {
                content: "Late note".to_string(),
                status_id: None,
            },
        )
        .await
        .map(|_| ())
        .unwrap_err(),
        run_cases::update_comment(
            fx.pool.connection(),
            &fx.editor,
            comment.id,
            UpdateCommentRequest {
                content: "Edited".to_string(),
            },
        )
        .await
        .map(|_| ())
        .unwrap_err(),
        run_cases::delete_comment(fx.pool.connection(), comment.id)
            .await
            .unwrap_err(),
        run_cases::delete_run_case(fx.pool.connection(), rc.id)
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, AppError::Conflict(_)), "unexpected error: {}", err);
    }
}
