//! Test run payloads and the run status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::NavNode;
use super::status::StatusRef;
use super::user::UserRef;

/// Run status. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RunStatus {
    #[serde(alias = "Draft")]
    NotStarted,
    InProgress,
    Completed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NotStarted" | "Draft" => Some(Self::NotStarted),
            "InProgress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comment attached to a run-case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommentView {
    pub id: i32,
    /// Status the run-case was moved to with this comment.
    pub status: Option<StatusRef>,
    pub content: String,
    pub created_by: Option<UserRef>,
    pub updated_by: Option<UserRef>,
    pub created_at: DateTime<Utc>,
}

/// A run-case as it appears inside a run view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunCaseView {
    /// Run-case ID.
    pub id: i32,
    pub test_case_id: i32,
    pub title: String,
    pub content: String,
    pub status: StatusRef,
    pub assigned_to: Option<UserRef>,
    pub comments: Vec<CommentView>,
}

/// A suite of the run view, pruned to suites holding at least one run-case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunSuite {
    pub id: i32,
    pub name: String,
    #[schema(no_recursion)]
    pub test_suites: Vec<RunSuite>,
    pub test_cases: Vec<RunCaseView>,
}

/// Run view. For completed runs this is the frozen snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunView {
    pub project_id: i32,
    pub test_run_id: i32,
    pub test_plan_id: i32,
    pub status: RunStatus,
    pub entities: Vec<RunSuite>,
    /// Run-cases whose case is not filed under any suite.
    #[serde(default)]
    pub unfiled: Vec<RunCaseView>,
    pub folders: Vec<NavNode>,
}

impl RunView {
    /// Every run-case in the view: suites depth-first in display order, then unfiled.
    pub fn run_cases(&self) -> Vec<&RunCaseView> {
        fn walk<'a>(suites: &'a [RunSuite], out: &mut Vec<&'a RunCaseView>) {
            for suite in suites {
                out.extend(suite.test_cases.iter());
                walk(&suite.test_suites, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.entities, &mut out);
        out.extend(self.unfiled.iter());
        out
    }
}

/// Run row as listed under a plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    pub id: i32,
    pub project_id: i32,
    pub test_plan_id: i32,
    pub title: String,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of run-cases.
    pub count: usize,
    pub test_case_ids: Vec<i32>,
}

/// Runs of a plan.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunListResponse {
    pub entities: Vec<RunSummary>,
}

/// Request to create a run under a plan.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRunRequest {
    pub test_plan_id: i32,
    pub title: String,
}

/// Request to move a run to another status.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionRunRequest {
    pub status: RunStatus,
}

/// Desired full set of case IDs for a run.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SyncRunCasesRequest {
    pub test_case_ids: Vec<i32>,
}

/// What a run-case sync changed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SyncOutcome {
    pub test_run_id: i32,
    /// Case IDs that gained a run-case.
    pub added: Vec<i32>,
    /// Case IDs whose run-case was removed.
    pub removed: Vec<i32>,
    /// Run-cases left as they were.
    pub unchanged: usize,
}

/// Request to add a single case to a run.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddRunCaseRequest {
    pub test_run_id: i32,
    pub test_case_id: i32,
    #[serde(default)]
    pub assigned_to_id: Option<i32>,
}

/// Request to update a run-case. Absent fields are left unchanged; a `null`
/// assignee unassigns.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRunCaseRequest {
    #[serde(default)]
    pub status_id: Option<i32>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i32>)]
    pub assigned_to_id: Option<Option<i32>>,
}

/// Request to comment on a run-case, optionally moving it to a status.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub content: String,
    #[serde(default)]
    pub status_id: Option<i32>,
}

/// Request to edit a comment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub content: String,
}
