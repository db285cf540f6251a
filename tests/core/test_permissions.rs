//! Permission resolution for the seeded roles.

use casebook_lib::db;
use casebook_lib::error::AppError;
use casebook_lib::models::UserStatus;
use casebook_lib::services::permissions::{self, ADMIN, EDIT};
use sea_orm::Set;

use super::test_helpers::*;

#[tokio::test]
async fn test_seeded_roles_resolve_expected_permissions() {
    let fx = setup().await;
    let conn = fx.pool.connection();

    let admin = permissions::resolve_permissions(conn, &fx.admin).await.unwrap();
    assert!(admin.contains(EDIT) && admin.contains(ADMIN));

    let editor = permissions::resolve_permissions(conn, &fx.editor).await.unwrap();
    assert!(editor.contains(EDIT));
    assert!(!editor.contains(ADMIN));

    let viewer = permissions::resolve_permissions(conn, &fx.viewer).await.unwrap();
    assert!(viewer.is_empty());
}

#[tokio::test]
async fn test_user_without_role_holds_nothing() {
    let fx = setup().await;
    let nobody = create_user(&fx.pool, "No Role", "norole@example.com", None).await;

    assert!(
        !permissions::has_permission(fx.pool.connection(), &nobody, EDIT)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_unknown_user_holds_nothing() {
    let fx = setup().await;
    let ghost = casebook_lib::services::Subject::new(9_999);

    let perms = permissions::resolve_permissions(fx.pool.connection(), &ghost)
        .await
        .unwrap();
    assert!(perms.is_empty());
}

#[tokio::test]
async fn test_inactive_admin_is_denied() {
    let fx = setup().await;
    let conn = fx.pool.connection();

    let mut user: casebook_lib::entity::user::ActiveModel =
        db::users::find_by_id(conn, fx.admin.user_id)
            .await
            .unwrap()
            .unwrap()
            .into();
    user.status = Set(UserStatus::InActive.as_str().to_string());
    db::users::update(conn, user).await.unwrap();

    let err = permissions::authorize(conn, &fx.admin, EDIT).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_authorize() {
    let fx = setup().await;
    let conn = fx.pool.connection();

    permissions::authorize(conn, &fx.editor, EDIT).await.unwrap();

    let err = permissions::authorize(conn, &fx.editor, ADMIN).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = permissions::authorize(conn, &fx.viewer, EDIT).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
