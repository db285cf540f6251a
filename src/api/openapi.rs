//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Casebook Server",
        version = "0.1.0",
        description = "API server for managing test case catalogs, test plans and test runs"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::health::ready,
        openapi_json,
        // Catalog
        api::catalog::get_catalog,
        api::catalog::get_case,
        api::catalog::create_suite,
        api::catalog::update_suite,
        api::catalog::delete_suite,
        api::catalog::reorder_suites,
        api::catalog::create_case,
        api::catalog::update_case,
        api::catalog::delete_case,
        api::catalog::reorder_cases,
        // Plans
        api::plans::list_plans,
        api::plans::create_plan,
        api::plans::get_plan,
        api::plans::update_plan,
        api::plans::delete_plan,
        api::plans::get_plan_charts,
        api::plans::list_plan_runs,
        // Runs
        api::runs::create_run,
        api::runs::get_run,
        api::runs::transition_run,
        api::runs::sync_run_cases,
        api::runs::delete_run,
        api::runs::get_run_case,
        api::runs::add_run_case,
        api::runs::update_run_case,
        api::runs::delete_run_case,
        api::runs::add_comment,
        api::runs::update_comment,
        api::runs::delete_comment,
        // Statuses
        api::statuses::list_statuses,
        api::statuses::create_status,
        api::statuses::update_status,
        // Members
        api::members::update_member,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::DeletedResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::catalog::ReorderResponse,
            // Catalog
            models::NavNode,
            models::CaseSummary,
            models::CatalogSuite,
            models::CatalogView,
            models::MilestoneRef,
            models::CaseView,
            models::SuiteView,
            models::CreateSuiteRequest,
            models::UpdateSuiteRequest,
            models::CreateCaseRequest,
            models::UpdateCaseRequest,
            models::CasePosition,
            models::ReorderCasesRequest,
            models::SuitePosition,
            models::ReorderSuitesRequest,
            models::DeleteSuiteResponse,
            // Plans and runs
            models::PlanView,
            models::CreatePlanRequest,
            models::UpdatePlanRequest,
            models::PlanListResponse,
            models::PlanDetail,
            models::ChartEntry,
            models::PlanCharts,
            models::RunStatus,
            models::RunView,
            models::RunSuite,
            models::RunCaseView,
            models::CommentView,
            models::RunSummary,
            models::RunListResponse,
            models::CreateRunRequest,
            models::TransitionRunRequest,
            models::SyncRunCasesRequest,
            models::SyncOutcome,
            models::AddRunCaseRequest,
            models::UpdateRunCaseRequest,
            models::CreateCommentRequest,
            models::UpdateCommentRequest,
            // Statuses
            models::StatusRef,
            models::StatusView,
            models::StatusListResponse,
            models::CreateStatusRequest,
            models::UpdateStatusRequest,
            // Members
            models::UserStatus,
            models::UserRef,
            models::MemberView,
            models::UpdateMemberRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Catalog", description = "Test suites and test cases"),
        (name = "Plans", description = "Test plans and their charts"),
        (name = "Runs", description = "Test runs, run-cases and comments"),
        (name = "Statuses", description = "Run-case statuses"),
        (name = "Members", description = "Member records")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the bearer session token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the OpenAPI document.
#[utoipa::path(
    get,
    path = "/api/v1/openapi.json",
    tag = "Health",
    responses(
        (status = 200, description = "OpenAPI document")
    )
)]
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Configure the OpenAPI route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}
