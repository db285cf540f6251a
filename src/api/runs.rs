//! Test run, run-case and comment API handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    AddRunCaseRequest, CommentView, CreateCommentRequest, CreateRunRequest, DeletedResponse,
    RunCaseView, RunSummary, RunView, SyncOutcome, SyncRunCasesRequest, TransitionRunRequest,
    UpdateCommentRequest, UpdateRunCaseRequest,
};
use crate::services::{EDIT, authorize, plans, run_cases, run_freeze, run_sync};

/// Configure run, run-case and comment routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_run)
        .service(get_run)
        .service(transition_run)
        .service(sync_run_cases)
        .service(delete_run)
        .service(get_run_case)
        .service(add_run_case)
        .service(update_run_case)
        .service(delete_run_case)
        .service(add_comment)
        .service(update_comment)
        .service(delete_comment);
}

#[utoipa::path(
    post,
    path = "/api/v1/runs",
    tag = "Runs",
    request_body = CreateRunRequest,
    responses(
        (status = 201, description = "Test run created", body = RunSummary),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test plan not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("/runs")]
pub async fn create_run(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<CreateRunRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let run = plans::create_run(pool.connection(), &auth.subject, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(run))
}

/// Get the view of a run: the frozen snapshot once completed, live otherwise.
#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Test run ID")),
    responses(
        (status = 200, description = "Run view", body = RunView),
        (status = 404, description = "Test run not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/runs/{id}")]
pub async fn get_run(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let view = run_freeze::get_run_view(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Move a run to another status. Entering `Completed` freezes the run.
#[utoipa::path(
    put,
    path = "/api/v1/runs/{id}/status",
    tag = "Runs",
    params(("id" = i32, Path, description = "Test run ID")),
    request_body = TransitionRunRequest,
    responses(
        (status = 200, description = "Status changed", body = RunSummary),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test run not found"),
        (status = 409, description = "Test run is already completed")
    ),
    security(("bearer_auth" = []))
)]
#[put("/runs/{id}/status")]
pub async fn transition_run(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<TransitionRunRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let run = run_freeze::transition_run_status(
        pool.connection(),
        &auth.subject,
        path.into_inner(),
        body.status,
    )
    .await?;
    Ok(HttpResponse::Ok().json(run))
}

/// Make the run's case set equal the given case IDs.
#[utoipa::path(
    put,
    path = "/api/v1/runs/{id}/cases",
    tag = "Runs",
    params(("id" = i32, Path, description = "Test run ID")),
    request_body = SyncRunCasesRequest,
    responses(
        (status = 200, description = "Run cases synchronized", body = SyncOutcome),
        (status = 400, description = "Cross-project case or no single default status"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test run or case not found"),
        (status = 409, description = "Test run is completed")
    ),
    security(("bearer_auth" = []))
)]
#[put("/runs/{id}/cases")]
pub async fn sync_run_cases(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<SyncRunCasesRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let outcome =
        run_sync::sync_run_cases(pool.connection(), path.into_inner(), &body.test_case_ids)
            .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[utoipa::path(
    delete,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Test run ID")),
    responses(
        (status = 200, description = "Test run deleted", body = DeletedResponse),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test run not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/runs/{id}")]
pub async fn delete_run(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let id = path.into_inner();
    plans::delete_run(pool.connection(), id).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id, deleted: true }))
}

#[utoipa::path(
    get,
    path = "/api/v1/run-cases/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Run-case ID")),
    responses(
        (status = 200, description = "Run-case", body = RunCaseView),
        (status = 404, description = "Run-case not found")
    ),
    security(("bearer_auth" = []))
)]
#[get("/run-cases/{id}")]
pub async fn get_run_case(
    _auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let rc = run_cases::get_run_case(pool.connection(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rc))
}

#[utoipa::path(
    post,
    path = "/api/v1/run-cases",
    tag = "Runs",
    request_body = AddRunCaseRequest,
    responses(
        (status = 201, description = "Run-case added", body = RunCaseView),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Test run or case not found"),
        (status = 409, description = "Case already in run, or run completed")
    ),
    security(("bearer_auth" = []))
)]
#[post("/run-cases")]
pub async fn add_run_case(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    body: web::Json<AddRunCaseRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let rc = run_cases::add_run_case(pool.connection(), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(rc))
}

#[utoipa::path(
    put,
    path = "/api/v1/run-cases/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Run-case ID")),
    request_body = UpdateRunCaseRequest,
    responses(
        (status = 200, description = "Run-case updated", body = RunCaseView),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Run-case not found"),
        (status = 409, description = "Test run is completed")
    ),
    security(("bearer_auth" = []))
)]
#[put("/run-cases/{id}")]
pub async fn update_run_case(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateRunCaseRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let rc =
        run_cases::update_run_case(pool.connection(), path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(rc))
}

#[utoipa::path(
    delete,
    path = "/api/v1/run-cases/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Run-case ID")),
    responses(
        (status = 200, description = "Run-case deleted", body = DeletedResponse),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Run-case not found"),
        (status = 409, description = "Test run is completed")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/run-cases/{id}")]
pub async fn delete_run_case(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let id = path.into_inner();
    run_cases::delete_run_case(pool.connection(), id).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id, deleted: true }))
}

/// Comment on a run-case, optionally moving it to a status.
#[utoipa::path(
    post,
    path = "/api/v1/run-cases/{id}/comments",
    tag = "Runs",
    params(("id" = i32, Path, description = "Run-case ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentView),
        (status = 400, description = "Empty comment or unknown status"),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Run-case not found"),
        (status = 409, description = "Test run is completed")
    ),
    security(("bearer_auth" = []))
)]
#[post("/run-cases/{id}/comments")]
pub async fn add_comment(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let comment = run_cases::add_comment(
        pool.connection(),
        &auth.subject,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Created().json(comment))
}

#[utoipa::path(
    put,
    path = "/api/v1/comments/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentView),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Test run is completed")
    ),
    security(("bearer_auth" = []))
)]
#[put("/comments/{id}")]
pub async fn update_comment(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateCommentRequest>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let comment = run_cases::update_comment(
        pool.connection(),
        &auth.subject,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(comment))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    tag = "Runs",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = DeletedResponse),
        (status = 403, description = "Missing edit permission"),
        (status = 404, description = "Comment not found"),
        (status = 409, description = "Test run is completed")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    authorize(pool.connection(), &auth.subject, EDIT).await?;
    let id = path.into_inner();
    run_cases::delete_comment(pool.connection(), id).await?;
    Ok(HttpResponse::Ok().json(DeletedResponse { id, deleted: true }))
}
