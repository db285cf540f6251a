//! Status administration and the single-default rule.

use casebook_lib::error::AppError;
use casebook_lib::models::{CreateStatusRequest, UpdateStatusRequest};
use casebook_lib::services::statuses;

use super::test_helpers::*;

#[tokio::test]
async fn test_seeded_statuses_have_one_default() {
    let pool = create_test_pool().await;

    let list = statuses::list_statuses(pool.connection()).await.unwrap();
    let untested = status_id(&pool, "Untested").await;

    assert_eq!(list.default_id, Some(untested));
    assert_eq!(list.entities.iter().filter(|s| s.is_default).count(), 1);
    assert_eq!(
        statuses::default_status(pool.connection()).await.unwrap().id,
        untested
    );
}

#[tokio::test]
async fn test_promoting_a_status_moves_the_default() {
    let pool = create_test_pool().await;
    let retest = status_id(&pool, "Retest").await;

    let promoted = statuses::update_status(
        pool.connection(),
        retest,
        UpdateStatusRequest {
            is_default: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(promoted.is_default);

    let list = statuses::list_statuses(pool.connection()).await.unwrap();
    assert_eq!(list.default_id, Some(retest));
    assert_eq!(list.entities.iter().filter(|s| s.is_default).count(), 1);
}

#[tokio::test]
async fn test_creating_a_default_status_replaces_the_old_one() {
    let pool = create_test_pool().await;

    let created = statuses::create_status(
        pool.connection(),
        CreateStatusRequest {
            name: "Pending".to_string(),
            color: "#cccccc".to_string(),
            is_default: true,
        },
    )
    .await
    .unwrap();

    let list = statuses::list_statuses(pool.connection()).await.unwrap();
    assert_eq!(list.default_id, Some(created.id));
}

#[tokio::test]
async fn test_default_cannot_be_unset_directly() {
    let pool = create_test_pool().await;
    let untested = status_id(&pool, "Untested").await;

    let err = statuses::update_status(
        pool.connection(),
        untested,
        UpdateStatusRequest {
            is_default: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let list = statuses::list_statuses(pool.connection()).await.unwrap();
    assert_eq!(list.default_id, Some(untested));
}

#[tokio::test]
async fn test_rename_and_recolor() {
    let pool = create_test_pool().await;
    let blocked = status_id(&pool, "Blocked").await;

    let updated = statuses::update_status(
        pool.connection(),
        blocked,
        UpdateStatusRequest {
            name: Some("On hold".to_string()),
            color: Some("#123456".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "On hold");
    assert_eq!(updated.color, "#123456");
    assert!(!updated.is_default);

    let err = statuses::update_status(
        pool.connection(),
        blocked,
        UpdateStatusRequest {
            name: Some("  ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}
