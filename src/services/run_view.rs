//! Run materialization: the live view of a run, mirroring the catalog tree
//! pruned to the suites that hold at least one of the run's cases.

use std::collections::HashMap;

use sea_orm::ConnectionTrait;

use super::suite_tree::SuiteForest;
use crate::db;
use crate::entity::{comment, status, test_case, test_run, test_run_case, user};
use crate::error::{AppError, AppResult};
use crate::models::{
    CommentView, NavNode, RunCaseView, RunStatus, RunSuite, RunSummary, RunView, StatusRef,
    UserRef,
};

/// Parse the stored status of a run.
pub(crate) fn run_status(run: &test_run::Model) -> AppResult<RunStatus> {
    RunStatus::parse(&run.status).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Test run {} has unknown status '{}'",
            run.id, run.status
        ))
    })
}

/// Rows referenced by a batch of run-cases, loaded once per view.
struct Lookups {
    statuses: HashMap<i32, status::Model>,
    users: HashMap<i32, user::Model>,
    comments: HashMap<i32, Vec<comment::Model>>,
}

impl Lookups {
    async fn load<C: ConnectionTrait>(
        db: &C,
        run_cases: &[test_run_case::Model],
    ) -> AppResult<Self> {
        let statuses = db::statuses::list_all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let run_case_ids: Vec<i32> = run_cases.iter().map(|rc| rc.id).collect();
        let mut comments: HashMap<i32, Vec<comment::Model>> = HashMap::new();
        for c in db::comments::list_by_run_cases(db, &run_case_ids).await? {
            comments.entry(c.test_run_case_id).or_default().push(c);
        }

        let mut user_ids: Vec<i32> = run_cases.iter().filter_map(|rc| rc.assigned_to_id).collect();
        for c in comments.values().flatten() {
            user_ids.extend(c.created_by);
            user_ids.extend(c.updated_by);
        }
        user_ids.sort_unstable();
        user_ids.dedup();
        let users = db::users::find_by_ids(db, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(Self {
            statuses,
            users,
            comments,
        })
    }

    fn user(&self, id: Option<i32>) -> Option<UserRef> {
        id.and_then(|id| self.users.get(&id)).map(UserRef::from)
    }

    fn comment(&self, c: &comment::Model) -> CommentView {
        CommentView {
            id: c.id,
            status: c
                .status_id
                .and_then(|id| self.statuses.get(&id))
                .map(StatusRef::from),
            content: c.content.clone(),
            created_by: self.user(c.created_by),
            updated_by: self.user(c.updated_by),
            created_at: c.created_at,
        }
    }

    fn run_case(
        &self,
        rc: &test_run_case::Model,
        case: &test_case::Model,
    ) -> AppResult<RunCaseView> {
        let status = self.statuses.get(&rc.status_id).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Run-case {} references unknown status {}",
                rc.id, rc.status_id
            ))
        })?;

        Ok(RunCaseView {
            id: rc.id,
            test_case_id: case.id,
            title: case.title.clone(),
            content: case.content.clone(),
            status: StatusRef::from(status),
            assigned_to: self.user(rc.assigned_to_id),
            comments: self
                .comments
                .get(&rc.id)
                .map(|cs| cs.iter().map(|c| self.comment(c)).collect())
                .unwrap_or_default(),
        })
    }
}

/// Build the live view of a run from the current catalog and run-case rows.
pub async fn materialize<C: ConnectionTrait>(
    db: &C,
    run: &test_run::Model,
) -> AppResult<RunView> {
    let run_cases = db::run_cases::list_by_run(db, run.id).await?;
    let case_ids: Vec<i32> = run_cases.iter().map(|rc| rc.test_case_id).collect();
    let cases: HashMap<i32, test_case::Model> = db::cases::find_by_ids(db, &case_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let lookups = Lookups::load(db, &run_cases).await?;

    let mut placed = Vec::with_capacity(run_cases.len());
    for rc in &run_cases {
        let case = cases.get(&rc.test_case_id).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Run-case {} references missing test case {}",
                rc.id, rc.test_case_id
            ))
        })?;
        placed.push((
            (case.order_index, case.id),
            case.test_suite_id,
            lookups.run_case(rc, case)?,
        ));
    }
    placed.sort_by_key(|(order, _, _)| *order);

    let mut by_suite: HashMap<Option<i32>, Vec<RunCaseView>> = HashMap::new();
    for (_, suite_id, view) in placed {
        by_suite.entry(suite_id).or_default().push(view);
    }

    let suites = db::suites::list_by_project(db, run.project_id).await?;
    let forest = SuiteForest::build(&suites)?;
    if let Some(orphan) = by_suite.keys().flatten().find(|id| !forest.contains(**id)) {
        return Err(AppError::InvalidInput(format!(
            "Test run {} holds cases filed under suite {} outside project {}",
            run.id, orphan, run.project_id
        )));
    }

    let entities = forest.fold(|suite, test_suites| {
        let test_cases = by_suite.remove(&Some(suite.id)).unwrap_or_default();
        if test_cases.is_empty() && test_suites.is_empty() {
            return None;
        }
        Some(RunSuite {
            id: suite.id,
            name: suite.name.clone(),
            test_suites,
            test_cases,
        })
    });

    Ok(RunView {
        project_id: run.project_id,
        test_run_id: run.id,
        test_plan_id: run.test_plan_id,
        status: run_status(run)?,
        folders: entities.iter().map(navigation).collect(),
        entities,
        unfiled: by_suite.remove(&None).unwrap_or_default(),
    })
}

fn navigation(suite: &RunSuite) -> NavNode {
    NavNode {
        key: suite.id,
        title: suite.name.clone(),
        children: suite.test_suites.iter().map(navigation).collect(),
    }
}

/// Live view of a single run-case.
pub async fn run_case_view<C: ConnectionTrait>(
    db: &C,
    rc: &test_run_case::Model,
) -> AppResult<RunCaseView> {
    let case = db::cases::find_by_id(db, rc.test_case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", rc.test_case_id)))?;
    let lookups = Lookups::load(db, std::slice::from_ref(rc)).await?;
    lookups.run_case(rc, &case)
}

/// View of a single comment.
pub async fn comment_view<C: ConnectionTrait>(
    db: &C,
    c: &comment::Model,
) -> AppResult<CommentView> {
    let status = match c.status_id {
        Some(id) => db::statuses::find_by_id(db, id).await?,
        None => None,
    };
    let author_ids: Vec<i32> = c.created_by.iter().chain(c.updated_by.iter()).copied().collect();
    let users: HashMap<i32, UserRef> = db::users::find_by_ids(db, &author_ids)
        .await?
        .iter()
        .map(|u| (u.id, UserRef::from(u)))
        .collect();

    Ok(CommentView {
        id: c.id,
        status: status.as_ref().map(StatusRef::from),
        content: c.content.clone(),
        created_by: c.created_by.and_then(|id| users.get(&id).cloned()),
        updated_by: c.updated_by.and_then(|id| users.get(&id).cloned()),
        created_at: c.created_at,
    })
}

/// Summary row of a run given its run-cases.
pub(crate) fn summarize(
    run: &test_run::Model,
    run_cases: &[&test_run_case::Model],
) -> AppResult<RunSummary> {
    let mut test_case_ids: Vec<i32> = run_cases.iter().map(|rc| rc.test_case_id).collect();
    test_case_ids.sort_unstable();

    Ok(RunSummary {
        id: run.id,
        project_id: run.project_id,
        test_plan_id: run.test_plan_id,
        title: run.title.clone(),
        status: run_status(run)?,
        started_at: run.started_at,
        completed_at: run.completed_at,
        count: test_case_ids.len(),
        test_case_ids,
    })
}

/// Summary row of a run, loading its run-cases.
pub async fn run_summary<C: ConnectionTrait>(
    db: &C,
    run: &test_run::Model,
) -> AppResult<RunSummary> {
    let run_cases = db::run_cases::list_by_run(db, run.id).await?;
    summarize(run, &run_cases.iter().collect::<Vec<_>>())
}
