//! Test plan payloads and status charts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::run::{RunStatus, RunSummary};

/// Plan row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanView {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Request to create a plan.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    pub project_id: i32,
    pub title: String,
}

/// Plans of a project.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanListResponse {
    pub entities: Vec<PlanView>,
}

/// A plan with its runs and their status breakdown.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanDetail {
    pub plan: PlanView,
    pub runs: Vec<RunSummary>,
    pub charts: PlanCharts,
}

/// Request to update a plan. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePlanRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<RunStatus>,
}

/// Count of run-cases in one status.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartEntry {
    pub name: String,
    pub color: String,
    pub count: u64,
}

/// Status breakdown across every run of a plan.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlanCharts {
    pub test_plan_id: i32,
    /// One entry per status in use, ordered by status ID descending.
    pub charts: Vec<ChartEntry>,
    pub total: u64,
    pub finished: u64,
    /// `finished / total` as a percentage, 0 when the plan has no run-cases.
    pub percentage: f64,
}
