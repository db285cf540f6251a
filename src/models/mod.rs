//! Domain models and wire payloads.

use serde::{Deserialize, Deserializer};

pub mod catalog;
pub mod plan;
pub mod run;
pub mod status;
pub mod user;

// Re-export commonly used types
pub use catalog::{
    CasePosition, CaseSummary, CaseView, CatalogSuite, CatalogView, CreateCaseRequest,
    CreateSuiteRequest, DeleteSuiteResponse, MilestoneRef, NavNode, ReorderCasesRequest,
    ReorderSuitesRequest, SuitePosition, SuiteView, UpdateCaseRequest, UpdateSuiteRequest,
};
pub use plan::{
    ChartEntry, CreatePlanRequest, PlanCharts, PlanDetail, PlanListResponse, PlanView,
    UpdatePlanRequest,
};
pub use run::{
    AddRunCaseRequest, CommentView, CreateCommentRequest, CreateRunRequest, RunCaseView,
    RunListResponse, RunStatus, RunSuite, RunSummary, RunView, SyncOutcome, SyncRunCasesRequest,
    TransitionRunRequest, UpdateCommentRequest, UpdateRunCaseRequest,
};
pub use status::{
    CreateStatusRequest, StatusListResponse, StatusRef, StatusView, UpdateStatusRequest,
};
pub use user::{MemberView, UpdateMemberRequest, UserRef, UserStatus};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
/// in patch payloads.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response for delete operations.
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct DeletedResponse {
    pub id: i32,
    pub deleted: bool,
}
