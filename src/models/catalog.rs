//! Catalog payloads: suites, cases and their tree views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::UserRef;
use crate::entity::{test_case, test_suite};

/// Identity-only tree node used by navigation sidebars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NavNode {
    /// Suite ID.
    pub key: i32,
    /// Suite name.
    pub title: String,
    #[schema(no_recursion)]
    pub children: Vec<NavNode>,
}

/// A case as listed inside the catalog tree.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseSummary {
    pub id: i32,
    pub title: String,
    pub order_index: i32,
    pub milestone_id: Option<i32>,
}

impl From<&test_case::Model> for CaseSummary {
    fn from(m: &test_case::Model) -> Self {
        Self {
            id: m.id,
            title: m.title.clone(),
            order_index: m.order_index,
            milestone_id: m.milestone_id,
        }
    }
}

/// A suite in the catalog tree with its child suites and own cases, both sibling-ordered.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogSuite {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub order_index: i32,
    #[schema(no_recursion)]
    pub test_suites: Vec<CatalogSuite>,
    pub test_cases: Vec<CaseSummary>,
}

/// Full catalog of a project.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogView {
    pub project_id: i32,
    /// Root suites.
    pub entities: Vec<CatalogSuite>,
    /// Cases not filed under any suite.
    pub unfiled: Vec<CaseSummary>,
    /// Navigation tree mirroring `entities`.
    pub folders: Vec<NavNode>,
}

/// Milestone reference embedded in case views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MilestoneRef {
    pub id: i32,
    pub title: String,
}

/// Case detail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseView {
    pub id: i32,
    pub project_id: i32,
    pub test_suite_id: Option<i32>,
    pub milestone: Option<MilestoneRef>,
    pub title: String,
    pub content: String,
    pub order_index: i32,
    pub created_by: Option<UserRef>,
    pub updated_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Suite row as returned by suite mutations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuiteView {
    pub id: i32,
    pub project_id: i32,
    pub parent_id: Option<i32>,
    pub name: String,
    pub order_index: i32,
}

impl From<test_suite::Model> for SuiteView {
    fn from(m: test_suite::Model) -> Self {
        Self {
            id: m.id,
            project_id: m.project_id,
            parent_id: m.parent_id,
            name: m.name,
            order_index: m.order_index,
        }
    }
}

/// Request to create a suite. It is appended after its last sibling.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSuiteRequest {
    pub project_id: i32,
    #[serde(default)]
    pub parent_id: Option<i32>,
    pub name: String,
}

/// Request to update a suite.
///
/// `parent_id` absent leaves the parent unchanged; `null` moves the suite to the root.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSuiteRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub parent_id: Option<Option<i32>>,
}

/// Request to create a case. It is appended after the last case of its suite.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCaseRequest {
    pub project_id: i32,
    #[serde(default)]
    pub test_suite_id: Option<i32>,
    #[serde(default)]
    pub milestone_id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Request to update a case. Absent fields are left unchanged; `null` clears.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCaseRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub test_suite_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub milestone_id: Option<Option<i32>>,
}

/// Target position of one case in a bulk reorder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CasePosition {
    pub test_case_id: i32,
    pub index: i32,
}

/// Move cases into a suite at the given positions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReorderCasesRequest {
    pub test_suite_id: i32,
    pub test_cases: Vec<CasePosition>,
}

/// Target position of one suite in a bulk reorder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct SuitePosition {
    pub test_suite_id: i32,
    pub index: i32,
}

/// Move suites under a parent (or to the root) at the given positions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReorderSuitesRequest {
    #[serde(default)]
    pub parent_id: Option<i32>,
    pub test_suites: Vec<SuitePosition>,
}

/// Result of a cascading suite delete.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteSuiteResponse {
    pub deleted_suites: usize,
    pub deleted_cases: usize,
    pub deleted_run_cases: usize,
}
