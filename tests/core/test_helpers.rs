//! Shared test helpers for the core integration tests.

use actix_web::{App, dev::ServiceResponse, test, web};
use casebook_lib::auth::{SessionKey, issue_session_token};
use casebook_lib::config::{DatabaseSettings, FinishedStatuses};
use casebook_lib::db::{self, DbPool};
use casebook_lib::models::{CreateCaseRequest, CreatePlanRequest, CreateRunRequest, CreateSuiteRequest};
use casebook_lib::services::{Subject, catalog, plans, seed_defaults};
use secrecy::SecretString;

/// Secret used to sign session tokens in tests.
pub const TEST_JWT_SECRET: &str = "casebook-core-test-secret";

/// A migrated, seeded database with one project and one user per built-in role.
pub struct Fixture {
    pub pool: DbPool,
    pub project_id: i32,
    pub admin: Subject,
    pub editor: Subject,
    pub viewer: Subject,
}

/// Create a fresh in-memory database with migrations and seed data applied.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::connect(&DatabaseSettings::in_memory())
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    seed_defaults(pool.connection())
        .await
        .expect("Failed to seed defaults");
    pool
}

/// Create a fresh database with a project and users.
pub async fn setup() -> Fixture {
    let pool = create_test_pool().await;
    let project = db::projects::insert(pool.connection(), "CORE", "Core project", None)
        .await
        .expect("Failed to create project");

    let admin = create_user(&pool, "Ada Admin", "ada@example.com", Some("Administrator")).await;
    let editor = create_user(&pool, "Eddie Editor", "eddie@example.com", Some("Editor")).await;
    let viewer = create_user(&pool, "Vera Viewer", "vera@example.com", Some("Viewer")).await;

    Fixture {
        pool,
        project_id: project.id,
        admin,
        editor,
        viewer,
    }
}

/// Insert a user, optionally holding one of the seeded roles.
pub async fn create_user(pool: &DbPool, name: &str, email: &str, role: Option<&str>) -> Subject {
    let role_id = match role {
        Some(role) => Some(
            db::users::find_role_by_name(pool.connection(), role)
                .await
                .expect("Failed to look up role")
                .unwrap_or_else(|| panic!("Role {} not seeded", role))
                .id,
        ),
        None => None,
    };

    let user = db::users::insert(pool.connection(), name, email, "not-a-real-hash", role_id)
        .await
        .expect("Failed to create user");
    Subject::new(user.id)
}

/// Create a suite through the catalog service.
pub async fn create_suite(pool: &DbPool, project_id: i32, parent_id: Option<i32>, name: &str) -> i32 {
    catalog::create_suite(
        pool.connection(),
        CreateSuiteRequest {
            project_id,
            parent_id,
            name: name.to_string(),
        },
    )
    .await
    .expect("Failed to create suite")
    .id
}

/// Create a case through the catalog service.
pub async fn create_case(
    pool: &DbPool,
    actor: &Subject,
    project_id: i32,
    test_suite_id: Option<i32>,
    title: &str,
) -> i32 {
    catalog::create_case(
        pool.connection(),
        actor,
        CreateCaseRequest {
            project_id,
            test_suite_id,
            milestone_id: None,
            title: title.to_string(),
            content: format!("Steps for {}", title),
        },
    )
    .await
    .expect("Failed to create case")
    .id
}

/// Create a plan with one run. Returns `(plan_id, run_id)`.
pub async fn create_plan_with_run(pool: &DbPool, actor: &Subject, project_id: i32) -> (i32, i32) {
    let plan = plans::create_plan(
        pool.connection(),
        actor,
        CreatePlanRequest {
            project_id,
            title: "Release plan".to_string(),
        },
    )
    .await
    .expect("Failed to create plan");

    let run = create_run(pool, actor, plan.id, "Run").await;
    (plan.id, run)
}

/// Create a run under an existing plan.
pub async fn create_run(pool: &DbPool, actor: &Subject, plan_id: i32, title: &str) -> i32 {
    plans::create_run(
        pool.connection(),
        actor,
        CreateRunRequest {
            test_plan_id: plan_id,
            title: title.to_string(),
        },
    )
    .await
    .expect("Failed to create run")
    .id
}

/// ID of a seeded status by name.
pub async fn status_id(pool: &DbPool, name: &str) -> i32 {
    db::statuses::list_all(pool.connection())
        .await
        .expect("Failed to list statuses")
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("Status {} not seeded", name))
        .id
}

pub fn session_key() -> SessionKey {
    SessionKey::new(SecretString::from(TEST_JWT_SECRET.to_string()))
}

/// Sign a session token for the subject.
pub fn token_for(subject: &Subject) -> String {
    issue_session_token(subject.user_id, &session_key(), 3600).expect("Failed to issue token")
}

/// Create a test app serving every `/api/v1` route.
pub async fn create_test_app(
    pool: &DbPool,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(session_key()))
            .app_data(web::Data::new(FinishedStatuses::AllButDefault))
            .service(web::scope("/api/v1").configure(casebook_lib::api::configure_routes)),
    )
    .await
}
