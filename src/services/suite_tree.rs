//! Suite tree builder.
//!
//! Suites live in an arena indexed by ID. Child lists are keyed by parent ID
//! (`None` for roots) and sorted by `(order_index, id)`, so every traversal is
//! deterministic regardless of the order rows come back from the store.

use std::collections::HashMap;

use crate::entity::test_suite;
use crate::error::{AppError, AppResult};
use crate::models::NavNode;

/// Validated, ordered view over the suites of one project.
pub struct SuiteForest<'a> {
    suites: &'a [test_suite::Model],
    index: HashMap<i32, usize>,
    children: HashMap<Option<i32>, Vec<usize>>,
}

impl<'a> SuiteForest<'a> {
    /// Index the suites and check the tree is well formed.
    ///
    /// A suite whose parent is not in `suites` or a suite that cannot be
    /// reached from a root (a cycle) is a data-integrity error.
    pub fn build(suites: &'a [test_suite::Model]) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(suites.len());
        for (i, suite) in suites.iter().enumerate() {
            if index.insert(suite.id, i).is_some() {
                return Err(AppError::InvalidInput(format!(
                    "Suite {} appears more than once",
                    suite.id
                )));
            }
        }

        let mut children: HashMap<Option<i32>, Vec<usize>> = HashMap::new();
        for (i, suite) in suites.iter().enumerate() {
            if let Some(parent_id) = suite.parent_id
                && !index.contains_key(&parent_id)
            {
                return Err(AppError::InvalidInput(format!(
                    "Suite {} references missing parent suite {}",
                    suite.id, parent_id
                )));
            }
            children.entry(suite.parent_id).or_default().push(i);
        }

        for siblings in children.values_mut() {
            siblings.sort_by_key(|&i| (suites[i].order_index, suites[i].id));
        }

        let forest = Self {
            suites,
            index,
            children,
        };

        let reachable = forest.count_reachable();
        if reachable != suites.len() {
            return Err(AppError::InvalidInput(format!(
                "Suite tree contains a cycle ({} of {} suites unreachable from a root)",
                suites.len() - reachable,
                suites.len()
            )));
        }

        Ok(forest)
    }

    fn count_reachable(&self) -> usize {
        let mut stack: Vec<usize> = self.child_indexes(None).to_vec();
        let mut seen = 0;

        while let Some(i) = stack.pop() {
            seen += 1;
            stack.extend_from_slice(self.child_indexes(Some(self.suites[i].id)));
        }

        seen
    }

    fn child_indexes(&self, parent_id: Option<i32>) -> &[usize] {
        self.children
            .get(&parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of suites in the forest.
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&'a test_suite::Model> {
        self.index.get(&id).map(|&i| &self.suites[i])
    }

    pub fn contains(&self, id: i32) -> bool {
        self.index.contains_key(&id)
    }

    /// Ordered children of `parent_id`; `None` yields the roots.
    pub fn children(&self, parent_id: Option<i32>) -> impl Iterator<Item = &'a test_suite::Model> + '_ {
        self.child_indexes(parent_id)
            .iter()
            .map(move |&i| &self.suites[i])
    }

    /// IDs from the parent of `id` up to its root. Empty for roots and unknown IDs.
    pub fn ancestors(&self, id: i32) -> Vec<i32> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(|s| s.parent_id);

        while let Some(parent_id) = current {
            chain.push(parent_id);
            current = self.get(parent_id).and_then(|s| s.parent_id);
        }

        chain
    }

    /// `id` and every suite below it, children before parents.
    pub fn descendants_post_order(&self, id: i32) -> Vec<i32> {
        let mut out = Vec::new();
        if self.contains(id) {
            self.collect_post_order(id, &mut out);
        }
        out
    }

    fn collect_post_order(&self, id: i32, out: &mut Vec<i32>) {
        for &child in self.child_indexes(Some(id)) {
            self.collect_post_order(self.suites[child].id, out);
        }
        out.push(id);
    }

    /// Build a tree of `N` bottom-up.
    ///
    /// `f` receives each suite with the already-built nodes of its children
    /// and returns `None` to drop the suite from its parent's list.
    pub fn fold<N, F>(&self, mut f: F) -> Vec<N>
    where
        F: FnMut(&'a test_suite::Model, Vec<N>) -> Option<N>,
    {
        self.fold_level(None, &mut f)
    }

    fn fold_level<N, F>(&self, parent_id: Option<i32>, f: &mut F) -> Vec<N>
    where
        F: FnMut(&'a test_suite::Model, Vec<N>) -> Option<N>,
    {
        let mut nodes = Vec::new();
        for &i in self.child_indexes(parent_id) {
            let suite = &self.suites[i];
            let children = self.fold_level(Some(suite.id), f);
            if let Some(node) = f(suite, children) {
                nodes.push(node);
            }
        }
        nodes
    }

    /// Identity-only navigation tree over every suite.
    pub fn navigation(&self) -> Vec<NavNode> {
        self.fold(|suite, children| {
            Some(NavNode {
                key: suite.id,
                title: suite.name.clone(),
                children,
            })
        })
    }
}
