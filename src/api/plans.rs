//! Test plan API handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::SessionAuth;
use crate::config::FinishedStatuses;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    CreatePlanRequest, DeletedResponse, PlanCharts, PlanDetail, PlanListResponse, PlanView,
    RunListResponse, UpdatePlanRequest,
};
use crate::services::{EDIT, authorize, plan_charts, plans};

/// Configure plan routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_plans)
        .service(create_plan)
        .service(get_plan)
        .service(update_plan)
        .service(delete_plan)
        .service(get_plan_charts)
        .service(list_plan_runs);
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/plans",
    tag = "Plans",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Plans of the project", body = PlanListResponse),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/projects/{id}/plans")]
pub async fn list_plans(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let plans = plans::list_plans(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(plans))
}

#[utoipa::path(
    post,
    path = "/api/v1/plans",
    tag = "Plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Test plan created", body = PlanView),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/plans")]
pub async fn create_plan(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreatePlanRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let plan = plans::create_plan(pool.connection(), &auth.subject, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(plan))
}

/// A plan with its runs and charts.
#[utoipa::path(
    get,
    path = "/api/v1/plans/{id}",
    tag = "Plans",
    params(("id" = i32, Path, description = "Test plan ID")),
    responses(
        (status = 200, description = "Test plan", body = PlanDetail),
        (status = 404, description = "Test plan not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/plans/{id}")]
pub async fn get_plan(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    finished: web::Data<FinishedStatuses>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let plan = plans::get_plan(pool.connection(), path.into_inner(), finished.get_ref()).await?;
    Ok(HttpResponse::Ok().json(plan))
}

#[utoipa::path(
    put,
    path = "/api/v1/plans/{id}",
    tag = "Plans",
    params(("id" = i32, Path, description = "Test plan ID")),
    request_body = UpdatePlanRequest,
    responses(
        (status = 200, description = "Test plan updated", body = PlanView),
        (status = 400, description = "Empty title"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test plan not found"),
        (status = 409, description = "Test plan is completed")
    ),
    security(("bearer_auth" = []))
)]
#[put("/plans/{id}")]
pub async fn update_plan(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdatePlanRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let plan = plans::update_plan(
        pool.connection(),
        &auth.subject,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(plan))
}

/// Delete a plan together with its runs.
#[utoipa::path(
    delete,
    path = "/api/v1/plans/{id}",
    tag = "Plans",
    params(("id" = i32, Path, description = "Test plan ID")),
    responses(
        (status = 200, description = "Test plan deleted", body = DeletedResponse),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test plan not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/plans/{id}")]
pub async fn delete_plan(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let id = path.into_inner();
    plans::delete_plan(pool.connection(), id).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id, deleted: true }))
}

/// Status breakdown and completion percentage across the plan's runs.
#[utoipa::path(
    get,
    path = "/api/v1/plans/{id}/charts",
    tag = "Plans",
    params(("id" = i32, Path, description = "Test plan ID")),
    responses(
        (status = 200, description = "Plan charts", body = PlanCharts),
        (status = 404, description = "Test plan not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/plans/{id}/charts")]
pub async fn get_plan_charts(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    finished: web::Data<FinishedStatuses>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let charts =
        plan_charts::get_plan_charts(pool.connection(), path.into_inner(), finished.get_ref())
            .await?;
    Ok(HttpResponse::Ok().json(charts))
}

#[utoipa::path(
    get,
    path = "/api/v1/plans/{id}/runs",
    tag = "Plans",
    params(("id" = i32, Path, description = "Test plan ID")),
    responses(
        (status = 200, description = "Runs of the plan", body = RunListResponse),
        (status = 404, description = "Test plan not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/plans/{id}/runs")]
pub async fn list_plan_runs(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let runs = plans::list_plan_runs(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(runs))
}
