//! HTTP surface: session authentication and permission gates.

use actix_web::http::StatusCode;
use actix_web::test;
use casebook_lib::db;
use casebook_lib::services::Subject;
use serde_json::{Value, json};

use super::test_helpers::*;

async fn suite_count(fx: &Fixture) -> usize {
    db::suites::list_by_project(fx.pool.connection(), fx.project_id)
        .await
        .unwrap()
        .len()
}

#[actix_rt::test]
async fn test_health_is_public() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let fx = setup().await;
    let app = create_test_app(&fx.pool).await;
    let uri = format!("/api/v1/projects/{}/catalog", fx.project_id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(("Authorization", "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Well-signed token for a user that does not exist.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(("Authorization", format!("Bearer {}", token_for(&Subject::new(9_999)))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_viewer_can_read_but_not_write() {
    let fx = setup().await;
    let app = create_test_app(&fx.pool).await;
    let token = token_for(&fx.viewer);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{}/catalog", fx.project_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/suites")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "project_id": fx.project_id, "name": "Blocked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(suite_count(&fx).await, 0);
}

#[actix_rt::test]
async fn test_editor_creates_suite_and_case() {
    let fx = setup().await;
    let app = create_test_app(&fx.pool).await;
    let token = token_for(&fx.editor);

    let req = test::TestRequest::post()
        .uri("/api/v1/suites")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "project_id": fx.project_id, "name": "Login" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let suite: Value = test::read_body_json(resp).await;
    let suite_id = suite["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/cases")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({
            "project_id": fx.project_id,
            "test_suite_id": suite_id,
            "title": "Valid credentials",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{}/catalog", fx.project_id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let catalog: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(catalog["entities"][0]["name"], "Login");
    assert_eq!(
        catalog["entities"][0]["test_cases"][0]["title"],
        "Valid credentials"
    );
}

#[actix_rt::test]
async fn test_completing_twice_returns_conflict() {
    let fx = setup().await;
    let app = create_test_app(&fx.pool).await;
    let token = token_for(&fx.editor);
    let (_, run) = create_plan_with_run(&fx.pool, &fx.editor, fx.project_id).await;

    let complete = || {
        test::TestRequest::put()
            .uri(&format!("/api/v1/runs/{}/status", run))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(json!({ "status": "Completed" }))
            .to_request()
    };

    let resp = test::call_service(&app, complete()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, complete()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_openapi_document_is_served() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let req = test::TestRequest::get().uri("/api/v1/openapi.json").to_request();
    let doc: Value = test::call_and_read_body_json(&app, req).await;

    assert!(doc["paths"]["/api/v1/runs/{id}/status"].is_object());
}
