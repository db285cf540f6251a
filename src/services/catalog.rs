//! Catalog service: suite and case reads, CRUD, bulk reorder and cascade delete.
//!
//! Every multi-row mutation runs in a single transaction; returning early with
//! an error drops the transaction, which rolls it back.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait};
use tracing::{info, warn};

use super::permissions::Subject;
use super::suite_tree::SuiteForest;
use crate::db;
use crate::entity::test_case;
use crate::error::{AppError, AppResult};
use crate::models::{
    CaseSummary, CaseView, CatalogSuite, CatalogView, CreateCaseRequest, CreateSuiteRequest,
    DeleteSuiteResponse, MilestoneRef, ReorderCasesRequest, ReorderSuitesRequest, SuiteView,
    UpdateCaseRequest, UpdateSuiteRequest, UserRef,
};

fn required_text<'a>(field: &str, value: &'a str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}

fn reject_duplicates(kind: &str, ids: impl IntoIterator<Item = i32>) -> AppResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::InvalidInput(format!(
                "{} {} listed more than once",
                kind, id
            )));
        }
    }
    Ok(())
}

/// Load the nested tree and navigation tree of a project.
pub async fn get_catalog<C: ConnectionTrait>(db: &C, project_id: i32) -> AppResult<CatalogView> {
    db::projects::find_by_id(db, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", project_id)))?;

    let suites = db::suites::list_by_project(db, project_id).await?;
    let forest = SuiteForest::build(&suites)?;
    let cases = db::cases::list_by_project(db, project_id).await?;

    let mut by_suite: HashMap<Option<i32>, Vec<CaseSummary>> = HashMap::new();
    for case in &cases {
        if let Some(suite_id) = case.test_suite_id
            && !forest.contains(suite_id)
        {
            return Err(AppError::InvalidInput(format!(
                "Test case {} is filed under suite {} which is not in project {}",
                case.id, suite_id, project_id
            )));
        }
        by_suite
            .entry(case.test_suite_id)
            .or_default()
            .push(CaseSummary::from(case));
    }

    let entities = forest.fold(|suite, test_suites| {
        Some(CatalogSuite {
            id: suite.id,
            name: suite.name.clone(),
            parent_id: suite.parent_id,
            order_index: suite.order_index,
            test_suites,
            test_cases: by_suite.remove(&Some(suite.id)).unwrap_or_default(),
        })
    });

    Ok(CatalogView {
        project_id,
        entities,
        unfiled: by_suite.remove(&None).unwrap_or_default(),
        folders: forest.navigation(),
    })
}

/// Load a single case with its milestone and authors.
pub async fn get_case<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<CaseView> {
    let case = db::cases::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

    let milestone = match case.milestone_id {
        Some(milestone_id) => db::milestones::find_by_id(db, milestone_id)
            .await?
            .map(|m| MilestoneRef {
                id: m.id,
                title: m.title,
            }),
        None => None,
    };

    let author_ids: Vec<i32> = case.created_by.iter().chain(case.updated_by.iter()).copied().collect();
    let authors: HashMap<i32, UserRef> = db::users::find_by_ids(db, &author_ids)
        .await?
        .iter()
        .map(|u| (u.id, UserRef::from(u)))
        .collect();

    Ok(CaseView {
        id: case.id,
        project_id: case.project_id,
        test_suite_id: case.test_suite_id,
        milestone,
        title: case.title,
        content: case.content,
        order_index: case.order_index,
        created_by: case.created_by.and_then(|u| authors.get(&u).cloned()),
        updated_by: case.updated_by.and_then(|u| authors.get(&u).cloned()),
        created_at: case.created_at,
        updated_at: case.updated_at,
    })
}

/// Check that `suite_id` exists and belongs to `project_id`.
async fn require_suite_in_project<C: ConnectionTrait>(
    db: &C,
    suite_id: i32,
    project_id: i32,
) -> AppResult<()> {
    let suite = db::suites::find_by_id(db, suite_id).await?.ok_or_else(|| {
        AppError::InvalidInput(format!("Test suite {} does not exist", suite_id))
    })?;

    if suite.project_id != project_id {
        return Err(AppError::InvalidInput(format!(
            "Test suite {} belongs to project {}, not {}",
            suite_id, suite.project_id, project_id
        )));
    }

    Ok(())
}

/// Check that `milestone_id` exists and belongs to `project_id`.
async fn require_milestone_in_project<C: ConnectionTrait>(
    db: &C,
    milestone_id: i32,
    project_id: i32,
) -> AppResult<()> {
    let milestone = db::milestones::find_by_id(db, milestone_id)
        .await?
        .ok_or_else(|| {
            AppError::InvalidInput(format!("Milestone {} does not exist", milestone_id))
        })?;

    if milestone.project_id != project_id {
        return Err(AppError::InvalidInput(format!(
            "Milestone {} belongs to project {}, not {}",
            milestone_id, milestone.project_id, project_id
        )));
    }

    Ok(())
}

/// Create a suite at the end of its sibling list.
pub async fn create_suite(db: &DatabaseConnection, req: CreateSuiteRequest) -> AppResult<SuiteView> {
    let name = required_text("name", &req.name)?;

    let txn = db.begin().await?;

    db::projects::find_by_id(&txn, req.project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", req.project_id)))?;

    if let Some(parent_id) = req.parent_id {
        require_suite_in_project(&txn, parent_id, req.project_id).await?;
    }

    let order_index = db::suites::next_order_index(&txn, req.project_id, req.parent_id).await?;
    let suite =
        db::suites::insert(&txn, req.project_id, req.parent_id, name, order_index).await?;

    txn.commit().await?;

    info!(
        suite_id = suite.id,
        project_id = suite.project_id,
        parent_id = ?suite.parent_id,
        "Test suite created"
    );

    Ok(suite.into())
}

/// Rename and/or re-parent a suite. A re-parented suite goes to the end of
/// its new sibling list.
pub async fn update_suite(
    db: &DatabaseConnection,
    id: i32,
    req: UpdateSuiteRequest,
) -> AppResult<SuiteView> {
    let txn = db.begin().await?;

    let suite = db::suites::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

    if let Some(name) = &req.name {
        db::suites::rename(&txn, id, required_text("name", name)?).await?;
    }

    if let Some(new_parent) = req.parent_id
        && new_parent != suite.parent_id
    {
        if let Some(parent_id) = new_parent {
            require_suite_in_project(&txn, parent_id, suite.project_id).await?;

            let all = db::suites::list_by_project(&txn, suite.project_id).await?;
            let forest = SuiteForest::build(&all)?;
            if parent_id == id || forest.ancestors(parent_id).contains(&id) {
                warn!(suite_id = id, parent_id, "Rejected suite move that would create a cycle");
                return Err(AppError::InvalidInput(format!(
                    "Moving suite {} under suite {} would create a cycle",
                    id, parent_id
                )));
            }
        }

        let order_index = db::suites::next_order_index(&txn, suite.project_id, new_parent).await?;
        db::suites::set_position(&txn, id, new_parent, order_index).await?;
    }

    let updated = db::suites::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

    txn.commit().await?;

    info!(suite_id = id, "Test suite updated");

    Ok(updated.into())
}

/// Delete a suite, every suite below it, their cases, and the run-cases and
/// comments referencing those cases.
pub async fn delete_suite(db: &DatabaseConnection, id: i32) -> AppResult<DeleteSuiteResponse> {
    let txn = db.begin().await?;

    let suite = db::suites::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;

    let all = db::suites::list_by_project(&txn, suite.project_id).await?;
    let forest = SuiteForest::build(&all)?;
    let suite_ids = forest.descendants_post_order(id);

    let case_ids = db::cases::ids_in_suites(&txn, &suite_ids).await?;
    let run_case_ids = db::run_cases::ids_for_cases(&txn, &case_ids).await?;

    db::comments::delete_by_run_cases(&txn, &run_case_ids).await?;
    db::run_cases::delete_by_ids(&txn, &run_case_ids).await?;
    db::cases::delete_by_ids(&txn, &case_ids).await?;
    // Post-order: children are removed before their parent.
    for suite_id in &suite_ids {
        db::suites::delete_by_id(&txn, *suite_id).await?;
    }

    txn.commit().await?;

    info!(
        suite_id = id,
        deleted_suites = suite_ids.len(),
        deleted_cases = case_ids.len(),
        deleted_run_cases = run_case_ids.len(),
        "Test suite deleted"
    );

    Ok(DeleteSuiteResponse {
        deleted_suites: suite_ids.len(),
        deleted_cases: case_ids.len(),
        deleted_run_cases: run_case_ids.len(),
    })
}

/// Create a case at the end of its suite (or of the unfiled list).
pub async fn create_case(
    db: &DatabaseConnection,
    actor: &Subject,
    req: CreateCaseRequest,
) -> AppResult<CaseView> {
    let title = required_text("title", &req.title)?;

    let txn = db.begin().await?;

    db::projects::find_by_id(&txn, req.project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {}", req.project_id)))?;

    if let Some(suite_id) = req.test_suite_id {
        require_suite_in_project(&txn, suite_id, req.project_id).await?;
    }
    if let Some(milestone_id) = req.milestone_id {
        require_milestone_in_project(&txn, milestone_id, req.project_id).await?;
    }

    let order_index =
        db::cases::next_order_index(&txn, req.project_id, req.test_suite_id).await?;
    let case = db::cases::insert(
        &txn,
        db::cases::NewCase {
            project_id: req.project_id,
            test_suite_id: req.test_suite_id,
            milestone_id: req.milestone_id,
            title,
            content: &req.content,
            order_index,
            author_id: actor.user_id,
        },
    )
    .await?;

    txn.commit().await?;

    info!(
        case_id = case.id,
        project_id = case.project_id,
        suite_id = ?case.test_suite_id,
        "Test case created"
    );

    get_case(db, case.id).await
}

/// Update the given fields of a case. Moving it to another suite appends it
/// to that suite's case list.
pub async fn update_case(
    db: &DatabaseConnection,
    actor: &Subject,
    id: i32,
    req: UpdateCaseRequest,
) -> AppResult<CaseView> {
    let txn = db.begin().await?;

    let case = db::cases::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

    let mut active: test_case::ActiveModel = case.clone().into();

    if let Some(title) = &req.title {
        active.title = Set(required_text("title", title)?.to_string());
    }
    if let Some(content) = req.content {
        active.content = Set(content);
    }
    if let Some(suite_id) = req.test_suite_id
        && suite_id != case.test_suite_id
    {
        if let Some(suite_id) = suite_id {
            require_suite_in_project(&txn, suite_id, case.project_id).await?;
        }
        let order_index = db::cases::next_order_index(&txn, case.project_id, suite_id).await?;
        active.test_suite_id = Set(suite_id);
        active.order_index = Set(order_index);
    }
    if let Some(milestone_id) = req.milestone_id {
        if let Some(milestone_id) = milestone_id {
            require_milestone_in_project(&txn, milestone_id, case.project_id).await?;
        }
        active.milestone_id = Set(milestone_id);
    }
    active.updated_by = Set(Some(actor.user_id));
    active.updated_at = Set(Utc::now());

    db::cases::update(&txn, active).await?;
    txn.commit().await?;

    info!(case_id = id, "Test case updated");

    get_case(db, id).await
}

/// Delete a case together with its run-cases and their comments.
pub async fn delete_case(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    db::cases::find_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

    let run_case_ids = db::run_cases::ids_for_cases(&txn, &[id]).await?;
    db::comments::delete_by_run_cases(&txn, &run_case_ids).await?;
    db::run_cases::delete_by_ids(&txn, &run_case_ids).await?;
    db::cases::delete_by_ids(&txn, &[id]).await?;

    txn.commit().await?;

    info!(
        case_id = id,
        deleted_run_cases = run_case_ids.len(),
        "Test case deleted"
    );

    Ok(())
}

/// Move the listed cases into a suite at the given positions, all or nothing.
///
/// Only `test_suite_id` and `order_index` of the listed cases are written.
pub async fn reorder_cases(db: &DatabaseConnection, req: ReorderCasesRequest) -> AppResult<usize> {
    if req.test_cases.is_empty() {
        return Err(AppError::InvalidInput(
            "test_cases must list at least one case".to_string(),
        ));
    }
    reject_duplicates("Test case", req.test_cases.iter().map(|p| p.test_case_id))?;

    let txn = db.begin().await?;

    let suite = db::suites::find_by_id(&txn, req.test_suite_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test suite {}", req.test_suite_id)))?;

    let ids: Vec<i32> = req.test_cases.iter().map(|p| p.test_case_id).collect();
    let found: HashMap<i32, test_case::Model> = db::cases::find_by_ids(&txn, &ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    for id in &ids {
        let case = found
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;
        if case.project_id != suite.project_id {
            return Err(AppError::InvalidInput(format!(
                "Test case {} belongs to project {}, not {}",
                id, case.project_id, suite.project_id
            )));
        }
    }

    for position in &req.test_cases {
        db::cases::set_position(&txn, position.test_case_id, Some(suite.id), position.index)
            .await?;
    }

    txn.commit().await?;

    info!(
        suite_id = suite.id,
        moved = ids.len(),
        "Test cases reordered"
    );

    Ok(ids.len())
}

/// Move the listed suites under a parent (or to the root) at the given
/// positions, all or nothing.
///
/// Rejected when the target parent is one of the moved suites or lies below
/// one of them.
pub async fn reorder_suites(db: &DatabaseConnection, req: ReorderSuitesRequest) -> AppResult<usize> {
    if req.test_suites.is_empty() {
        return Err(AppError::InvalidInput(
            "test_suites must list at least one suite".to_string(),
        ));
    }
    reject_duplicates("Test suite", req.test_suites.iter().map(|p| p.test_suite_id))?;

    let txn = db.begin().await?;

    let ids: Vec<i32> = req.test_suites.iter().map(|p| p.test_suite_id).collect();
    let found: HashMap<i32, i32> = db::suites::find_by_ids(&txn, &ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s.project_id))
        .collect();

    let mut project_id = None;
    for id in &ids {
        let suite_project = *found
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Test suite {}", id)))?;
        match project_id {
            None => project_id = Some(suite_project),
            Some(p) if p != suite_project => {
                return Err(AppError::InvalidInput(
                    "All reordered suites must belong to the same project".to_string(),
                ));
            }
            Some(_) => {}
        }
    }
    let project_id = project_id.ok_or_else(|| {
        AppError::InvalidInput("test_suites must list at least one suite".to_string())
    })?;

    if let Some(parent_id) = req.parent_id {
        let parent = db::suites::find_by_id(&txn, parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test suite {}", parent_id)))?;
        if parent.project_id != project_id {
            return Err(AppError::InvalidInput(format!(
                "Parent suite {} belongs to project {}, not {}",
                parent_id, parent.project_id, project_id
            )));
        }

        let all = db::suites::list_by_project(&txn, project_id).await?;
        let forest = SuiteForest::build(&all)?;
        let moved: HashSet<i32> = ids.iter().copied().collect();
        if let Some(offender) = std::iter::once(parent_id)
            .chain(forest.ancestors(parent_id))
            .find(|id| moved.contains(id))
        {
            warn!(
                suite_id = offender,
                parent_id, "Rejected suite reorder that would create a cycle"
            );
            return Err(AppError::InvalidInput(format!(
                "Moving suite {} under suite {} would create a cycle",
                offender, parent_id
            )));
        }
    }

    for position in &req.test_suites {
        db::suites::set_position(&txn, position.test_suite_id, req.parent_id, position.index)
            .await?;
    }

    txn.commit().await?;

    info!(
        project_id,
        parent_id = ?req.parent_id,
        moved = ids.len(),
        "Test suites reordered"
    );

    Ok(ids.len())
}
