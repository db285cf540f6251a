//! Member record administration.

use casebook_lib::db;
use casebook_lib::error::AppError;
use casebook_lib::models::{UpdateMemberRequest, UserStatus};
use casebook_lib::services::members;

use super::test_helpers::*;

#[tokio::test]
async fn test_member_edits_own_profile() {
    let fx = setup().await;

    let view = members::update_member(
        fx.pool.connection(),
        &fx.viewer,
        fx.viewer.user_id,
        UpdateMemberRequest {
            name: Some("Vera V.".to_string()),
            language: Some("de".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(view.name, "Vera V.");
    assert_eq!(view.language, "de");
    assert_eq!(view.email, "vera@example.com");
}

#[tokio::test]
async fn test_editing_another_member_requires_admin() {
    let fx = setup().await;

    let err = members::update_member(
        fx.pool.connection(),
        &fx.editor,
        fx.viewer.user_id,
        UpdateMemberRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let view = members::update_member(
        fx.pool.connection(),
        &fx.admin,
        fx.viewer.user_id,
        UpdateMemberRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(view.name, "Renamed");
}

#[tokio::test]
async fn test_role_and_status_changes_require_admin() {
    let fx = setup().await;
    let admin_role = db::users::find_role_by_name(fx.pool.connection(), "Administrator")
        .await
        .unwrap()
        .unwrap();

    let err = members::update_member(
        fx.pool.connection(),
        &fx.editor,
        fx.editor.user_id,
        UpdateMemberRequest {
            role_id: Some(Some(admin_role.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let view = members::update_member(
        fx.pool.connection(),
        &fx.admin,
        fx.editor.user_id,
        UpdateMemberRequest {
            status: Some(UserStatus::InActive),
            role_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(view.status, UserStatus::InActive);
    assert_eq!(view.role_id, None);
}

#[tokio::test]
async fn test_member_field_validation() {
    let fx = setup().await;

    let bad_email = members::update_member(
        fx.pool.connection(),
        &fx.viewer,
        fx.viewer.user_id,
        UpdateMemberRequest {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_email, AppError::InvalidInput(_)));

    let bad_role = members::update_member(
        fx.pool.connection(),
        &fx.admin,
        fx.viewer.user_id,
        UpdateMemberRequest {
            role_id: Some(Some(9_999)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(bad_role, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_unknown_member_is_not_found_for_admin() {
    let fx = setup().await;

    let err = members::update_member(
        fx.pool.connection(),
        &fx.admin,
        9_999,
        UpdateMemberRequest::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
