//! Integration tests for saving and restoring the group hierarchy.

use splice_core::{ItemId, SpliceError};
use splice_timeline::{GroupController, GroupsFile, CURRENT_VERSION};

fn grouped_timeline() -> GroupController {
    let controller = GroupController::new();
    for n in 1..=5 {
        controller.register_item(ItemId(n)).unwrap();
    }
    controller
        .group_selection(&[ItemId(1), ItemId(2)], ItemId(101))
        .unwrap();
    controller
        .group_selection(&[ItemId(2), ItemId(3)], ItemId(102))
        .unwrap();
    controller
}

#[test]
fn saved_groups_restore_cascades() {
    let controller = grouped_timeline();
    let json = GroupsFile::from_forest(&controller.snapshot())
        .to_json()
        .unwrap();

    let restored = GroupsFile::from_json(&json).unwrap().into_forest().unwrap();
    let restored = GroupController::from_forest(restored);

    assert_eq!(restored.snapshot(), controller.snapshot());
    assert_eq!(
        restored.cascade_targets(ItemId(3)).unwrap(),
        vec![ItemId(1), ItemId(2), ItemId(3)]
    );
    assert_eq!(restored.cascade_targets(ItemId(5)).unwrap(), vec![ItemId(5)]);
}

#[test]
fn saved_links_never_reference_forward() {
    let file = GroupsFile::from_forest(&grouped_timeline().snapshot());
    assert_eq!(file.version, CURRENT_VERSION);

    // A parent is either a root or was itself linked earlier in the list.
    let mut linked = Vec::new();
    for link in &file.links {
        let parent_is_root = file.links.iter().all(|l| l.child != link.parent);
        assert!(parent_is_root || linked.contains(&link.parent));
        linked.push(link.child);
    }
}

#[test]
fn garbage_input_is_rejected() {
    let result = GroupsFile::from_json(b"not json");
    assert!(matches!(result, Err(SpliceError::Serialization(_))));

    let result = GroupsFile::from_json(br#"{"version": 1, "items": "nope"}"#);
    assert!(matches!(result, Err(SpliceError::Serialization(_))));
}
