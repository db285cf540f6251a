//! Status API handlers.

use actix_web::{HttpResponse, get, post, put, web};

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{CreateStatusRequest, StatusListResponse, StatusView, UpdateStatusRequest};
use crate::services::{EDIT, authorize, statuses};

/// Configure status routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_statuses)
        .service(create_status)
        .service(update_status);
}

#[utoipa::path(
    get,
    path = "/api/v1/statuses",
    tag = "Statuses",
    responses(
        (status = 200, description = "All statuses", body = StatusListResponse)
    ),
    security(("bearer_auth" = []))
)]
#[get("/statuses")]
pub async fn list_statuses(_auth: SessionAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let list = statuses::list_statuses(pool.connection()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Create a status. Creating it as default clears the previous default.
#[utoipa::path(
    post,
    path = "/api/v1/statuses",
    tag = "Statuses",
    request_body = CreateStatusRequest,
    responses(
        (status = 201, description = "Status created", body = StatusView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing edit permission")
    ),
    security(("bearer_auth" = []))
)]
#[post("/statuses")]
pub async fn create_status(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateStatusRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let status = statuses::create_status(pool.connection(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(status))
}

#[utoipa::path(
    put,
    path = "/api/v1/statuses/{id}",
    tag = "Statuses",
    params(("id" = i32, Path, description = "Status ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Status not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/statuses/{id}")]
pub async fn update_status(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let status =
        statuses::update_status(pool.connection(), path.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}
