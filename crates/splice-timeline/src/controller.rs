//! Locked access to the group hierarchy for the timeline controller.
//!
//! `GroupForest` has no synchronization of its own. The controller owns it
//! behind a mutex so that grouping commands and cascading edits that read
//! group membership are serialized against each other.

use std::cmp::Reverse;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use splice_core::ItemId;
use tracing::{debug, warn};

use crate::error::GroupError;
use crate::groups::GroupForest;

/// Shared, lock-guarded handle to a timeline's group hierarchy.
#[derive(Debug, Clone, Default)]
pub struct GroupController {
    forest: Arc<Mutex<GroupForest>>,
}

impl GroupController {
    /// Create a controller over an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an existing hierarchy (e.g. one loaded from disk).
    pub fn from_forest(forest: GroupForest) -> Self {
        Self {
            forest: Arc::new(Mutex::new(forest)),
        }
    }

    /// Lock the hierarchy for a sequence of calls that must observe one
    /// consistent state.
    pub fn lock(&self) -> MutexGuard<'_, GroupForest> {
        self.forest.lock()
    }

    /// Copy of the current hierarchy.
    pub fn snapshot(&self) -> GroupForest {
        self.forest.lock().clone()
    }

    /// Register a freshly created timeline item.
    pub fn register_item(&self, id: ItemId) -> Result<(), GroupError> {
        refused("register", self.forest.lock().create_group_item(id))
    }

    /// Forget a timeline item; its direct children become ungrouped roots.
    pub fn unregister_item(&self, id: ItemId) -> Result<(), GroupError> {
        refused("unregister", self.forest.lock().destruct_group_item(id))
    }

    /// Group the current selection. See [`GroupForest::group_items`].
    pub fn group_selection(&self, ids: &[ItemId], group_id: ItemId) -> Result<ItemId, GroupError> {
        let group = refused("group", self.forest.lock().group_items(ids, group_id))?;
        debug!(group = group.get(), selected = ids.len(), "selection grouped");
        Ok(group)
    }

    /// Dissolve the top-level group containing `id`.
    pub fn ungroup(&self, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
        refused("ungroup", self.forest.lock().ungroup_item(id))
    }

    /// Timeline items a move, resize or delete of `id` has to act on: every
    /// leaf of the tree `id` belongs to, sorted.
    pub fn cascade_targets(&self, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
        let forest = self.forest.lock();
        let targets = refused("cascade", cascade_leaves(&forest, id))?;
        Ok(targets)
    }

    /// Remove the whole tree containing `id` and return the timeline items
    /// that were in it, sorted.
    ///
    /// Deepest nodes are destroyed first so no intermediate root is ever
    /// left behind.
    pub fn delete_cascade(&self, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
        let mut forest = self.forest.lock();
        refused("delete", delete_tree(&mut forest, id))
    }
}

fn delete_tree(forest: &mut GroupForest, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
    let leaves = cascade_leaves(forest, id)?;
    let root = forest.get_root_id(id)?;

    let mut nodes = forest
        .get_subtree(root)?
        .into_iter()
        .map(|node| forest.ancestors(node).map(|chain| (chain.len(), node)))
        .collect::<Result<Vec<_>, _>>()?;
    nodes.sort_unstable_by_key(|&(depth, node)| (Reverse(depth), node));
    for (_, node) in &nodes {
        forest.destruct_group_item(*node)?;
    }

    debug!(
        root = root.get(),
        removed = nodes.len(),
        "group tree deleted"
    );
    Ok(leaves)
}

fn cascade_leaves(forest: &GroupForest, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
    let root = forest.get_root_id(id)?;
    let mut leaves: Vec<_> = forest.get_leaves(root)?.into_iter().collect();
    leaves.sort_unstable();
    Ok(leaves)
}

/// Log a refused grouping operation before handing the error back.
fn refused<T>(op: &str, result: Result<T, GroupError>) -> Result<T, GroupError> {
    result.map_err(|err| {
        warn!(op, error = %err, "grouping operation refused");
        err
    })
}
