//! Group hierarchy of timeline items.
//!
//! Clips, compositions and synthetic group nodes are nested into a forest so
//! that move/resize/delete operations can cascade across everything the user
//! grouped together. Real timeline objects are the leaves; group nodes are
//! the inner nodes.
//!
//! The forest is stored as two maps keyed by item id (edges toward the parent
//! and edges toward the children), so nodes never reference each other.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use smallvec::SmallVec;
use splice_core::ItemId;
use tracing::{debug, error};

use crate::error::GroupError;

/// Ancestor chain of an item, nearest parent first.
pub type Ancestors = SmallVec<[ItemId; 8]>;

/// Forest of grouped timeline items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupForest {
    /// Edges toward the parent. Roots have no entry.
    up_link: HashMap<ItemId, ItemId>,
    /// Edges toward the children. Every registered item has an entry.
    down_link: HashMap<ItemId, HashSet<ItemId>>,
}

impl GroupForest {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` as a new ungrouped item.
    pub fn create_group_item(&mut self, id: ItemId) -> Result<(), GroupError> {
        if self.contains(id) {
            return Err(GroupError::DuplicateItem(id));
        }
        self.down_link.insert(id, HashSet::new());
        debug!(item = id.get(), "group item created");
        Ok(())
    }

    /// Unregister `id`.
    ///
    /// Direct children become roots; deeper descendants stay attached to
    /// their own parent.
    pub fn destruct_group_item(&mut self, id: ItemId) -> Result<(), GroupError> {
        self.ensure_registered(id)?;
        self.detach(id);
        let children = self.down_link.remove(&id).unwrap_or_default();
        for child in &children {
            self.up_link.remove(child);
        }
        debug!(
            item = id.get(),
            promoted = children.len(),
            "group item destroyed"
        );
        Ok(())
    }

    /// Topmost ancestor of `id`, or `id` itself when it is a root.
    pub fn get_root_id(&self, id: ItemId) -> Result<ItemId, GroupError> {
        self.ensure_registered(id)?;
        let limit = self.down_link.len();
        let mut current = id;
        let mut steps = 0;
        while let Some(&parent) = self.up_link.get(&current) {
            steps += 1;
            if steps > limit {
                return Err(self.corrupted(format!("parent chain of {} does not end", id)));
            }
            current = parent;
        }
        Ok(current)
    }

    /// Whether `id` has no children.
    pub fn is_leaf(&self, id: ItemId) -> Result<bool, GroupError> {
        self.children_of(id).map(HashSet::is_empty)
    }

    /// `id` together with all of its descendants.
    pub fn get_subtree(&self, id: ItemId) -> Result<HashSet<ItemId>, GroupError> {
        self.ensure_registered(id)?;
        let mut subtree = HashSet::new();
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            if subtree.insert(node) {
                if let Some(children) = self.down_link.get(&node) {
                    pending.extend(children.iter().copied());
                }
            }
        }
        Ok(subtree)
    }

    /// Leaves of the subtree rooted at `id`, i.e. the real timeline objects
    /// it contains.
    pub fn get_leaves(&self, id: ItemId) -> Result<HashSet<ItemId>, GroupError> {
        let subtree = self.get_subtree(id)?;
        Ok(subtree
            .into_iter()
            .filter(|node| self.down_link.get(node).map_or(true, HashSet::is_empty))
            .collect())
    }

    /// Move `id` under `group_id`.
    ///
    /// Fails without touching the forest when either item is unknown or when
    /// `group_id` lies inside the subtree of `id`.
    pub fn set_group(&mut self, id: ItemId, group_id: ItemId) -> Result<(), GroupError> {
        self.ensure_registered(id)?;
        self.ensure_registered(group_id)?;
        if id == group_id || self.ancestors(group_id)?.contains(&id) {
            return Err(GroupError::CycleRejected {
                item: id,
                group: group_id,
            });
        }
        if self.up_link.get(&id) == Some(&group_id) {
            return Ok(());
        }

        self.detach(id);
        self.up_link.insert(id, group_id);
        self.down_link.entry(group_id).or_default().insert(id);
        debug!(item = id.get(), group = group_id.get(), "item grouped");
        Ok(())
    }

    /// Detach `id` from its parent. A no-op for roots.
    ///
    /// The former parent stays registered even when it ends up empty.
    pub fn remove_from_group(&mut self, id: ItemId) -> Result<(), GroupError> {
        self.ensure_registered(id)?;
        if let Some(parent) = self.detach(id) {
            debug!(item = id.get(), group = parent.get(), "item removed from group");
        }
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    /// Whether `id` is registered.
    pub fn contains(&self, id: ItemId) -> bool {
        self.down_link.contains_key(&id)
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.down_link.len()
    }

    pub fn is_empty(&self) -> bool {
        self.down_link.is_empty()
    }

    /// All registered items, sorted.
    pub fn items(&self) -> Vec<ItemId> {
        let mut items: Vec<_> = self.down_link.keys().copied().collect();
        items.sort_unstable();
        items
    }

    /// All roots, sorted.
    pub fn roots(&self) -> Vec<ItemId> {
        let mut roots: Vec<_> = self
            .down_link
            .keys()
            .filter(|id| !self.up_link.contains_key(id))
            .copied()
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Immediate parent of `id`, if it is grouped.
    pub fn get_parent(&self, id: ItemId) -> Result<Option<ItemId>, GroupError> {
        self.ensure_registered(id)?;
        Ok(self.up_link.get(&id).copied())
    }

    /// Immediate children of `id`, sorted.
    pub fn get_direct_children(&self, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
        let mut children: Vec<_> = self.children_of(id)?.iter().copied().collect();
        children.sort_unstable();
        Ok(children)
    }

    /// Whether `id` belongs to any group.
    pub fn is_in_group(&self, id: ItemId) -> Result<bool, GroupError> {
        Ok(self.get_root_id(id)? != id)
    }

    /// Ancestors of `id`, from its parent up to its root.
    pub fn ancestors(&self, id: ItemId) -> Result<Ancestors, GroupError> {
        self.ensure_registered(id)?;
        let limit = self.down_link.len();
        let mut chain = Ancestors::new();
        let mut current = id;
        while let Some(&parent) = self.up_link.get(&current) {
            if chain.len() >= limit {
                return Err(self.corrupted(format!("parent chain of {} does not end", id)));
            }
            chain.push(parent);
            current = parent;
        }
        Ok(chain)
    }

    // ── Selection commands ─────────────────────────────────────

    /// Group the trees containing `ids` under a new group node `group_id`.
    ///
    /// When every id already shares one root, nothing changes and that root
    /// is returned. Otherwise `group_id` is registered, every distinct root
    /// is moved under it and `group_id` is returned.
    pub fn group_items(
        &mut self,
        ids: &[ItemId],
        group_id: ItemId,
    ) -> Result<ItemId, GroupError> {
        if ids.is_empty() {
            return Err(GroupError::EmptySelection);
        }
        let roots = ids
            .iter()
            .map(|&id| self.get_root_id(id))
            .collect::<Result<BTreeSet<_>, _>>()?;
        if roots.len() == 1 {
            if let Some(&root) = roots.iter().next() {
                return Ok(root);
            }
        }

        self.create_group_item(group_id)?;
        for root in roots {
            self.set_group(root, group_id)?;
        }
        Ok(group_id)
    }

    /// Dissolve the top-level group containing `id`.
    ///
    /// Returns the former children of that group, now roots, sorted. An item
    /// whose root is a leaf is not grouped; the call changes nothing and
    /// returns an empty list.
    pub fn ungroup_item(&mut self, id: ItemId) -> Result<Vec<ItemId>, GroupError> {
        let root = self.get_root_id(id)?;
        let children = self.get_direct_children(root)?;
        if children.is_empty() {
            return Ok(children);
        }
        self.destruct_group_item(root)?;
        Ok(children)
    }

    // ── Persistence helpers ────────────────────────────────────

    /// Every `(child, parent)` edge, ordered so that replaying `set_group`
    /// over them never references an item before its own link is in place.
    pub fn links(&self) -> Vec<(ItemId, ItemId)> {
        let mut links = Vec::with_capacity(self.up_link.len());
        let mut queue: VecDeque<ItemId> = self.roots().into();
        while let Some(node) = queue.pop_front() {
            let mut children: Vec<_> = self
                .down_link
                .get(&node)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            children.sort_unstable();
            for child in children {
                links.push((child, node));
                queue.push_back(child);
            }
        }
        links
    }

    /// Verify that both link maps agree and that no parent chain loops.
    pub fn check_consistency(&self) -> Result<(), GroupError> {
        for (&child, &parent) in &self.up_link {
            if !self.contains(child) {
                return Err(self.corrupted(format!("unregistered item {} has a parent", child)));
            }
            let linked = self
                .down_link
                .get(&parent)
                .is_some_and(|children| children.contains(&child));
            if !linked {
                return Err(self.corrupted(format!(
                    "{} points at parent {} which does not list it",
                    child, parent
                )));
            }
        }
        for (&parent, children) in &self.down_link {
            for &child in children {
                if self.up_link.get(&child) != Some(&parent) {
                    return Err(self.corrupted(format!(
                        "{} lists child {} which points elsewhere",
                        parent, child
                    )));
                }
            }
        }
        for &id in self.down_link.keys() {
            self.get_root_id(id)?;
        }
        Ok(())
    }

    // ── Internals ──────────────────────────────────────────────

    fn ensure_registered(&self, id: ItemId) -> Result<(), GroupError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GroupError::UnknownItem(id))
        }
    }

    fn children_of(&self, id: ItemId) -> Result<&HashSet<ItemId>, GroupError> {
        self.down_link.get(&id).ok_or(GroupError::UnknownItem(id))
    }

    /// Remove the edge between `id` and its parent. Returns the old parent.
    fn detach(&mut self, id: ItemId) -> Option<ItemId> {
        let parent = self.up_link.remove(&id)?;
        if let Some(siblings) = self.down_link.get_mut(&parent) {
            siblings.remove(&id);
        }
        Some(parent)
    }

    fn corrupted(&self, msg: String) -> GroupError {
        error!(items = self.len(), "{}", msg);
        GroupError::Corrupted(msg)
    }

    #[cfg(test)]
    pub(crate) fn force_parent(&mut self, id: ItemId, parent: ItemId) {
        self.up_link.insert(id, parent);
        self.down_link.entry(parent).or_default().insert(id);
    }
}
