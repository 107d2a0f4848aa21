use std::collections::BTreeMap;

use proptest::prelude::*;

use kgen_lock::domain::services::{diff_file_maps, hash_combined, Change, ChangeKind};

fn file_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,6}\\.ttl", "h[0-9]{3}", 0..12)
}

fn apply(old: &BTreeMap<String, String>, new: &BTreeMap<String, String>, changes: &[Change]) {
    let mut rebuilt = old.clone();
    for change in changes {
        match change.kind {
            ChangeKind::Added | ChangeKind::Modified => {
                rebuilt.insert(change.file.clone(), new[&change.file].clone());
            }
            ChangeKind::Removed => {
                rebuilt.remove(&change.file);
            }
        }
    }
    assert_eq!(&rebuilt, new);
}

proptest! {
    /// Replaying the change list onto the old map reconstructs the new map.
    #[test]
    fn diff_is_a_complete_edit_script(old in file_map(), new in file_map()) {
        let changes = diff_file_maps(&old, &new);
        apply(&old, &new, &changes);
    }

    /// Change lists are strictly sorted by path, so each path appears once.
    #[test]
    fn diff_output_is_strictly_sorted(old in file_map(), new in file_map()) {
        let changes = diff_file_maps(&old, &new);
        for pair in changes.windows(2) {
            prop_assert!(pair[0].file < pair[1].file);
        }
    }

    /// A map diffed against itself is always clean.
    #[test]
    fn diff_against_self_is_empty(map in file_map()) {
        prop_assert!(diff_file_maps(&map, &map.clone()).is_empty());
    }

    /// Every change kind matches map membership: added paths are only in
    /// the new map, removed only in the old, modified in both.
    #[test]
    fn change_kinds_match_membership(old in file_map(), new in file_map()) {
        for change in diff_file_maps(&old, &new) {
            match change.kind {
                ChangeKind::Added => {
                    prop_assert!(!old.contains_key(&change.file));
                    prop_assert!(new.contains_key(&change.file));
                }
                ChangeKind::Removed => {
                    prop_assert!(old.contains_key(&change.file));
                    prop_assert!(!new.contains_key(&change.file));
                }
                ChangeKind::Modified => {
                    prop_assert!(old[&change.file] != new[&change.file]);
                }
            }
        }
    }

    /// The combined digest is sensitive to component order.
    #[test]
    fn combined_hash_depends_on_order(
        a in "[a-z]{1,8}",
        b in "[a-z]{1,8}",
        ha in "sha256:[a-f0-9]{8}",
        hb in "sha256:[a-f0-9]{8}",
    ) {
        prop_assume!(a != b);
        let forward = hash_combined([(a.as_str(), ha.as_str()), (b.as_str(), hb.as_str())]);
        let reverse = hash_combined([(b.as_str(), hb.as_str()), (a.as_str(), ha.as_str())]);
        prop_assert_ne!(forward, reverse);
    }

    /// The combined digest is deterministic.
    #[test]
    fn combined_hash_is_deterministic(name in "[a-z]{1,8}", hash in "sha256:[a-f0-9]{8}") {
        let once = hash_combined([(name.as_str(), hash.as_str())]);
        let twice = hash_combined([(name.as_str(), hash.as_str())]);
        prop_assert_eq!(once, twice);
    }
}
