//! Catalog API handlers: suites, cases and bulk reorder.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    CaseView, CatalogView, CreateCaseRequest, CreateSuiteRequest, DeleteSuiteResponse,
    DeletedResponse, ReorderCasesRequest, ReorderSuitesRequest, SuiteView, UpdateCaseRequest,
    UpdateSuiteRequest,
};
use crate::services::{EDIT, authorize, catalog};

/// Response for bulk reorder endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReorderResponse {
    /// Number of rows moved.
    pub moved: usize,
}

/// Configure catalog routes. Reorder routes are registered before the
/// `{id}` routes they would otherwise collide with.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_catalog)
        .service(reorder_suites)
        .service(reorder_cases)
        .service(create_suite)
        .service(update_suite)
        .service(delete_suite)
        .service(get_case)
        .service(create_case)
        .service(update_case)
        .service(delete_case);
}

/// Get the suite tree and navigation tree of a project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/catalog",
    tag = "Catalog",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project catalog", body = CatalogView),
        (status = 400, description = "Suite tree is inconsistent"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/projects/{id}/catalog")]
pub async fn get_catalog(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let view = catalog::get_catalog(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "Test case ID")),
    responses(
        (status = 200, description = "Test case", body = CaseView),
        (status = 404, description = "Test case not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/cases/{id}")]
pub async fn get_case(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let case = catalog::get_case(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(case))
}

#[utoipa::path(
    post,
    path = "/api/v1/suites",
    tag = "Catalog",
    request_body = CreateSuiteRequest,
    responses(
        (status = 201, description = "Suite created", body = SuiteView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/suites")]
pub async fn create_suite(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateSuiteRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let suite = catalog::create_suite(pool.connection(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(suite))
}

/// Move the listed suites under a parent at the given positions.
#[utoipa::path(
    put,
    path = "/api/v1/suites/reorder",
    tag = "Catalog",
    request_body = ReorderSuitesRequest,
    responses(
        (status = 200, description = "Suites moved", body = ReorderResponse),
        (status = 400, description = "Empty, duplicated, cross-project or cyclic request"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Suite not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/suites/reorder")]
pub async fn reorder_suites(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<ReorderSuitesRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let moved = catalog::reorder_suites(pool.connection(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ReorderResponse { moved }))
}

#[utoipa::path(
    put,
    path = "/api/v1/suites/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "Suite ID")),
    request_body = UpdateSuiteRequest,
    responses(
        (status = 200, description = "Suite updated", body = SuiteView),
        (status = 400, description = "Invalid parent"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Suite not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/suites/{id}")]
pub async fn update_suite(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateSuiteRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let suite =
        catalog::update_suite(pool.connection(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(suite))
}

/// Delete a suite with every descendant suite, their cases and run-cases.
#[utoipa::path(
    delete,
    path = "/api/v1/suites/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "Suite ID")),
    responses(
        (status = 200, description = "Suite deleted", body = DeleteSuiteResponse),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Suite not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/suites/{id}")]
pub async fn delete_suite(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let deleted = catalog::delete_suite(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

/// Move the listed cases into a suite at the given positions.
#[utoipa::path(
    put,
    path = "/api/v1/cases/reorder",
    tag = "Catalog",
    request_body = ReorderCasesRequest,
    responses(
        (status = 200, description = "Cases moved", body = ReorderResponse),
        (status = 400, description = "Empty, duplicated or cross-project request"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Suite or case not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/cases/reorder")]
pub async fn reorder_cases(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<ReorderCasesRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let moved = catalog::reorder_cases(pool.connection(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ReorderResponse { moved }))
}

#[utoipa::path(
    post,
    path = "/api/v1/cases",
    tag = "Catalog",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Test case created", body = CaseView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/cases")]
pub async fn create_case(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateCaseRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let case = catalog::create_case(pool.connection(), &auth.subject, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(case))
}

#[utoipa::path(
    put,
    path = "/api/v1/cases/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "Test case ID")),
    request_body = UpdateCaseRequest,
    responses(
        (status = 200, description = "Test case updated", body = CaseView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test case not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/cases/{id}")]
pub async fn update_case(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateCaseRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let case = catalog::update_case(
        pool.connection(),
        &auth.subject,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(case))
}

#[utoipa::path(
    delete,
    path = "/api/v1/cases/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "Test case ID")),
    responses(
        (status = 200, description = "Test case deleted", body = DeletedResponse),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test case not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/cases/{id}")]
pub async fn delete_case(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let id = path.into_inner();
    catalog::delete_case(pool.connection(), id).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id, deleted: true }))
}
