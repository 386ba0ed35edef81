//! Integration tests for grouping commands.
//!
//! Drives the group hierarchy through the controller the way the editing
//! layer does: register clips, group the selection, cascade edits, ungroup.

use std::collections::HashSet;

use splice_core::{ItemId, SpliceError};
use splice_timeline::{GroupController, GroupError, GroupForest};

// ── Helpers ────────────────────────────────────────────────────

fn ids(raw: &[i32]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId).collect()
}

fn id_set(raw: &[i32]) -> HashSet<ItemId> {
    raw.iter().copied().map(ItemId).collect()
}

/// Clips 1..=6 on the timeline, none grouped.
fn timeline_clips() -> GroupController {
    let controller = GroupController::new();
    for n in 1..=6 {
        controller.register_item(ItemId(n)).unwrap();
    }
    controller
}

// ── Reference scenario ─────────────────────────────────────────

#[test]
fn group_destroy_and_cycle_scenario() {
    let mut forest = GroupForest::new();
    for n in [10, 11, 100] {
        forest.create_group_item(ItemId(n)).unwrap();
    }
    forest.set_group(ItemId(10), ItemId(100)).unwrap();
    forest.set_group(ItemId(11), ItemId(100)).unwrap();

    assert_eq!(forest.get_root_id(ItemId(10)).unwrap(), ItemId(100));
    assert_eq!(forest.get_subtree(ItemId(100)).unwrap(), id_set(&[100, 10, 11]));
    assert_eq!(forest.get_leaves(ItemId(100)).unwrap(), id_set(&[10, 11]));
    assert!(!forest.is_leaf(ItemId(100)).unwrap());
    assert!(forest.is_leaf(ItemId(10)).unwrap());

    forest.destruct_group_item(ItemId(100)).unwrap();
    assert_eq!(forest.get_root_id(ItemId(10)).unwrap(), ItemId(10));
    assert_eq!(forest.get_root_id(ItemId(11)).unwrap(), ItemId(11));
    assert_eq!(
        forest.get_subtree(ItemId(100)),
        Err(GroupError::UnknownItem(ItemId(100)))
    );

    forest.create_group_item(ItemId(100)).unwrap();
    forest.set_group(ItemId(10), ItemId(100)).unwrap();
    forest.set_group(ItemId(11), ItemId(100)).unwrap();
    assert!(matches!(
        forest.set_group(ItemId(100), ItemId(10)),
        Err(GroupError::CycleRejected { .. })
    ));
}

// ── Cascading edits ────────────────────────────────────────────

#[test]
fn nested_selection_cascades_to_all_clips() {
    let controller = timeline_clips();
    let a = controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();
    let b = controller.group_selection(&ids(&[3, 4]), ItemId(102)).unwrap();
    let top = controller.group_selection(&ids(&[2, 3]), ItemId(103)).unwrap();

    assert_eq!((a, b, top), (ItemId(101), ItemId(102), ItemId(103)));
    for clip in 1..=4 {
        assert_eq!(
            controller.cascade_targets(ItemId(clip)).unwrap(),
            ids(&[1, 2, 3, 4])
        );
    }
    assert_eq!(controller.cascade_targets(ItemId(5)).unwrap(), ids(&[5]));
}

#[test]
fn ungroup_peels_one_level_at_a_time() {
    let controller = timeline_clips();
    controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();
    controller.group_selection(&ids(&[1, 3]), ItemId(102)).unwrap();

    let promoted = controller.ungroup(ItemId(1)).unwrap();
    assert_eq!(promoted, ids(&[3, 101]));
    assert_eq!(controller.cascade_targets(ItemId(1)).unwrap(), ids(&[1, 2]));
    assert_eq!(controller.cascade_targets(ItemId(3)).unwrap(), ids(&[3]));

    let promoted = controller.ungroup(ItemId(1)).unwrap();
    assert_eq!(promoted, ids(&[1, 2]));
    assert_eq!(controller.cascade_targets(ItemId(1)).unwrap(), ids(&[1]));

    assert!(controller.ungroup(ItemId(1)).unwrap().is_empty());
}

#[test]
fn regrouping_same_selection_is_stable() {
    let controller = timeline_clips();
    let first = controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();
    let second = controller.group_selection(&ids(&[2, 1]), ItemId(102)).unwrap();

    assert_eq!(first, second);
    assert!(!controller.lock().contains(ItemId(102)));
}

#[test]
fn deleting_a_clip_from_a_group_keeps_the_group() {
    let controller = timeline_clips();
    controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();

    controller.unregister_item(ItemId(1)).unwrap();

    let forest = controller.snapshot();
    assert_eq!(forest.get_direct_children(ItemId(101)).unwrap(), ids(&[2]));
    assert_eq!(controller.cascade_targets(ItemId(2)).unwrap(), ids(&[2]));
    forest.check_consistency().unwrap();
}

#[test]
fn delete_cascade_removes_grouped_clips_only() {
    let controller = timeline_clips();
    controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();
    controller.group_selection(&ids(&[2, 5]), ItemId(102)).unwrap();

    let deleted = controller.delete_cascade(ItemId(5)).unwrap();

    assert_eq!(deleted, ids(&[1, 2, 5]));
    assert_eq!(controller.snapshot().items(), ids(&[3, 4, 6]));
}

#[test]
fn locked_sequence_sees_consistent_state() {
    let controller = timeline_clips();
    {
        let mut forest = controller.lock();
        forest.create_group_item(ItemId(101)).unwrap();
        forest.set_group(ItemId(1), ItemId(101)).unwrap();
        forest.set_group(ItemId(2), ItemId(101)).unwrap();
        assert_eq!(forest.get_leaves(ItemId(101)).unwrap(), id_set(&[1, 2]));
    }
    assert_eq!(controller.cascade_targets(ItemId(1)).unwrap(), ids(&[1, 2]));
}

// ── Refusals ───────────────────────────────────────────────────

#[test]
fn refused_grouping_translates_to_workspace_error() {
    let controller = timeline_clips();
    controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();

    let err = controller
        .group_selection(&ids(&[3, 4]), ItemId(101))
        .unwrap_err();
    assert_eq!(err, GroupError::DuplicateItem(ItemId(101)));

    let err: SpliceError = controller
        .group_selection(&ids(&[3, 42]), ItemId(104))
        .unwrap_err()
        .into();
    assert!(matches!(err, SpliceError::Grouping(_)));

    // Refusals leave the hierarchy untouched.
    let forest = controller.snapshot();
    assert_eq!(forest.roots(), ids(&[3, 4, 5, 6, 101]));
    forest.check_consistency().unwrap();
}

#[test]
fn cycle_through_controller_lock_is_rejected() {
    let controller = timeline_clips();
    controller.group_selection(&ids(&[1, 2]), ItemId(101)).unwrap();
    controller.group_selection(&ids(&[1, 3]), ItemId(102)).unwrap();
    let before = controller.snapshot();

    let result = controller.lock().set_group(ItemId(102), ItemId(101));

    assert_eq!(
        result,
        Err(GroupError::CycleRejected {
            item: ItemId(102),
            group: ItemId(101),
        })
    );
    assert_eq!(controller.snapshot(), before);
}
