//! Schema created by the migrator matches the entity definitions.

use casebook_lib::db;
use casebook_lib::entity::{
    comment, milestone, permission, project, role, role_permission, status, test_case, test_plan,
    test_run, test_run_case, test_suite, user,
};
use casebook_lib::migration::Migrator;
use sea_orm::{EntityName, EntityTrait};
use sea_orm_migration::{MigratorTrait, SchemaManager};

use super::test_helpers::*;

#[tokio::test]
async fn test_every_entity_table_exists() {
    let pool = create_test_pool().await;
    let manager = SchemaManager::new(pool.connection());

    let tables = [
        project::Entity.table_name(),
        milestone::Entity.table_name(),
        user::Entity.table_name(),
        role::Entity.table_name(),
        permission::Entity.table_name(),
        role_permission::Entity.table_name(),
        status::Entity.table_name(),
        test_suite::Entity.table_name(),
        test_case::Entity.table_name(),
        test_plan::Entity.table_name(),
        test_run::Entity.table_name(),
        test_run_case::Entity.table_name(),
        comment::Entity.table_name(),
    ];

    for table in tables {
        assert!(
            manager.has_table(table).await.unwrap(),
            "table {} was not created",
            table
        );
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let pool = create_test_pool().await;

    Migrator::up(pool.connection(), None).await.unwrap();

    let pending = Migrator::get_pending_migrations(pool.connection())
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_one_row_per_entity_round_trips() {
    let pool = create_test_pool().await;
    let conn = pool.connection();

    let project = db::projects::insert(conn, "RT", "Round trip", Some("schema check"))
        .await
        .unwrap();
    let milestone = db::milestones::insert(conn, project.id, "v1.0").await.unwrap();
    let role = db::users::insert_role(conn, "Auditor").await.unwrap();
    let permission = db::users::insert_permission(conn, "audit").await.unwrap();
    db::users::grant(conn, role.id, permission.id).await.unwrap();
    let author = db::users::insert(conn, "Rita", "rita@example.com", "hash", Some(role.id))
        .await
        .unwrap();
    let status = db::statuses::insert(conn, "Flaky", "#ff00ff", false)
        .await
        .unwrap();
    let suite = db::suites::insert(conn, project.id, None, "Root", 0)
        .await
        .unwrap();
    let case = db::cases::insert(
        conn,
        db::cases::NewCase {
            project_id: project.id,
            test_suite_id: Some(suite.id),
            milestone_id: Some(milestone.id),
            title: "Round trip",
            content: "Body",
            order_index: 0,
            author_id: author.id,
        },
    )
    .await
    .unwrap();
    let plan = db::plans::insert(conn, project.id, "Plan", author.id)
        .await
        .unwrap();
    let run = db::runs::insert(conn, project.id, plan.id, "Run", author.id)
        .await
        .unwrap();
    let run_case = db::run_cases::insert(conn, run.id, case.id, status.id, Some(author.id))
        .await
        .unwrap();
    let note = db::comments::insert(conn, run_case.id, Some(status.id), "Seen once", author.id)
        .await
        .unwrap();

    assert_eq!(
        project::Entity::find_by_id(project.id).one(conn).await.unwrap().map(|p| p.code),
        Some("RT".to_string())
    );
    assert_eq!(
        milestone::Entity::find_by_id(milestone.id)
            .one(conn)
            .await
            .unwrap()
            .map(|m| m.project_id),
        Some(project.id)
    );
    assert_eq!(
        db::users::permission_names_for_role(conn, role.id).await.unwrap(),
        vec!["audit".to_string()]
    );
    assert_eq!(
        db::users::find_by_id(conn, author.id).await.unwrap().and_then(|u| u.role_id),
        Some(role.id)
    );
    assert_eq!(
        db::statuses::find_by_id(conn, status.id).await.unwrap().map(|s| s.name),
        Some("Flaky".to_string())
    );
    assert_eq!(
        db::suites::find_by_id(conn, suite.id).await.unwrap().map(|s| s.name),
        Some("Root".to_string())
    );

    let stored_case = db::cases::find_by_id(conn, case.id).await.unwrap().unwrap();
    assert_eq!(stored_case.test_suite_id, Some(suite.id));
    assert_eq!(stored_case.milestone_id, Some(milestone.id));
    assert_eq!(stored_case.created_by, Some(author.id));

    assert_eq!(
        db::plans::find_by_id(conn, plan.id).await.unwrap().map(|p| p.title),
        Some("Plan".to_string())
    );

    let stored_run = db::runs::find_by_id(conn, run.id).await.unwrap().unwrap();
    assert_eq!(stored_run.test_plan_id, plan.id);
    assert!(stored_run.frozen_snapshot.is_none());

    let stored_rc = db::run_cases::find_by_id(conn, run_case.id).await.unwrap().unwrap();
    assert_eq!(stored_rc.status_id, status.id);
    assert_eq!(stored_rc.assigned_to_id, Some(author.id));

    let stored_note = db::comments::find_by_id(conn, note.id).await.unwrap().unwrap();
    assert_eq!(stored_note.test_run_case_id, run_case.id);
    assert_eq!(stored_note.content, "Seen once");
}
