//! Member API handlers.

use actix_web::{HttpResponse, put, web};

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{MemberView, UpdateMemberRequest};
use crate::services::members;

/// Configure member routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(update_member);
}

/// Update a member record. Own record always; other records, `status` and
/// `role_id` require the admin permission.
#[utoipa::path(
    put,
    path = "/api/v1/members/{id}",
    tag = "Members",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MemberView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not allowed to edit this member"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
#[put("/members/{id}")]
pub async fn update_member(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UpdateMemberRequest>,
) -> AppResult<HttpResponse> {
    let member = members::update_member(
        pool.connection(),
        &auth.subject,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(member))
}
